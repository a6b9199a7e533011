//! Ember 2.x templates: the fragment and its render nodes are built by the
//! artifact, every statement is then applied to the render node at the
//! same position.

use id_tree::NodeId;
use log::trace;
use serde_json::Value as JsonValue;
use shave_template::{
    opcode::{parse_statement, Statement},
    parser::parse_revision,
    BlockMorph, ElementMorph, Morph, Node,
};

use crate::{
    artifact::{Artifact, BuildFragmentFn, BuildRenderNodesFn},
    dom::{MorphHandle, RecordingDocument, SlotRef},
    error::{DecompileError, Result},
};

struct ValidTemplate<'a> {
    build_fragment: &'a BuildFragmentFn,
    build_render_nodes: &'a BuildRenderNodesFn,
    statements: &'a [JsonValue],
    templates: &'a [Artifact],
}

fn validate(artifact: &Artifact) -> Result<ValidTemplate<'_>> {
    let meta = artifact
        .meta
        .as_ref()
        .filter(|meta| meta.is_object())
        .ok_or_else(|| DecompileError::invalid_artifact("meta", "is missing or not an object"))?;
    let revision = meta
        .get("revision")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| DecompileError::invalid_artifact("meta.revision", "is missing or not a string"))?;
    if parse_revision(revision).is_err() {
        return Err(DecompileError::invalid_artifact(
            "meta.revision",
            format!("`{revision}` carries no `Ember@<major>` marker"),
        )
        .into());
    }

    let build_fragment = artifact
        .build_fragment
        .as_ref()
        .ok_or_else(|| DecompileError::invalid_artifact("buildFragment", "is missing"))?;
    let build_render_nodes = artifact
        .build_render_nodes
        .as_ref()
        .ok_or_else(|| DecompileError::invalid_artifact("buildRenderNodes", "is missing"))?;
    let statements = artifact
        .statements
        .as_ref()
        .and_then(JsonValue::as_array)
        .ok_or_else(|| DecompileError::invalid_artifact("statements", "is missing or not an array"))?;
    let templates = artifact
        .templates
        .as_ref()
        .ok_or_else(|| DecompileError::invalid_artifact("templates", "is missing"))?;

    Ok(ValidTemplate {
        build_fragment,
        build_render_nodes,
        statements,
        templates,
    })
}

fn wrong_kind(statement: &Statement, handle: &MorphHandle) -> DecompileError {
    DecompileError::WrongMorphKind {
        statement: format!("{:?}", statement.op()).to_lowercase(),
        found: handle.handle_name().to_string(),
    }
}

fn expect_slot<'a>(statement: &Statement, handle: &'a MorphHandle) -> Result<&'a SlotRef> {
    match handle {
        MorphHandle::Slot(slot) => Ok(slot),
        other => Err(wrong_kind(statement, other).into()),
    }
}

// `morph.parent` of the render node
fn handle_parent(dom: &RecordingDocument, handle: &MorphHandle) -> Result<NodeId> {
    match handle {
        MorphHandle::Slot(slot) => dom.slot_parent(slot),
        MorphHandle::Attribute(morph) => dom.attr_morph_element(morph),
        MorphHandle::Element(morph) => Ok(morph.element().clone()),
    }
}

fn child_template(templates: &[Artifact], index: Option<usize>) -> Result<Option<Node>> {
    match index {
        None => Ok(None),
        Some(index) => {
            let template = templates.get(index).ok_or_else(|| {
                DecompileError::invalid_artifact(
                    "templates",
                    format!("has no entry #{index} ({} available)", templates.len()),
                )
            })?;
            render(template).map(Some)
        }
    }
}

fn evaluate_statement(
    dom: &mut RecordingDocument,
    handle: &MorphHandle,
    statement: Statement,
    templates: &[Artifact],
) -> Result<()> {
    match &statement {
        Statement::Inline(call) => {
            let slot = expect_slot(&statement, handle)?;
            dom.bind_slot(slot, Morph::Inline(call.clone()))
        }
        Statement::Attribute { value, .. } => match handle {
            MorphHandle::Attribute(morph) => dom.bind_attribute(morph, value.clone()),
            other => Err(wrong_kind(&statement, other).into()),
        },
        Statement::Element(call) => {
            let parent = handle_parent(dom, handle)?;
            dom.push_element_morph(&parent, ElementMorph::new(call.clone()))
        }
        Statement::Content(content) => {
            let slot = expect_slot(&statement, handle)?;
            dom.bind_slot(slot, Morph::Content(content.clone()))
        }
        Statement::Block {
            call,
            program,
            inverse,
        } => {
            let slot = expect_slot(&statement, handle)?;
            let program = child_template(templates, *program)?.unwrap_or(Node::Fragment(vec![]));
            let inverse = child_template(templates, *inverse)?;
            dom.bind_slot(
                slot,
                Morph::Block(BlockMorph::new(call.clone(), program, inverse)),
            )
        }
    }
}

pub fn render(artifact: &Artifact) -> Result<Node> {
    let template = validate(artifact)?;

    let mut dom = RecordingDocument::new()?;
    let fragment = (template.build_fragment)(&mut dom)?;
    let morphs = (template.build_render_nodes)(&mut dom, &fragment, None)?;

    if morphs.len() != template.statements.len() {
        return Err(DecompileError::StructuralMismatch {
            morphs: morphs.len(),
            statements: template.statements.len(),
        }
        .into());
    }

    for (handle, raw) in morphs.iter().zip(template.statements) {
        let statement = parse_statement(raw)?;
        trace!("applying {:?} to {}", statement.op(), handle.handle_name());
        evaluate_statement(&mut dom, handle, statement, template.templates)?;
    }

    dom.freeze(&fragment)
}
