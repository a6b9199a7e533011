//! Recording document handed to compiled templates.
//!
//! Every document call mutates an `id_tree` arena instead of a real DOM.
//! Once the template finished running, [`RecordingDocument::freeze`] turns
//! the recorded subtree into the immutable [`Node`] model.

use id_tree::{InsertBehavior, MoveBehavior, Node as TreeNode, NodeId, RemoveBehavior, Tree, TreeBuilder};
use shave_template::{AttributeMorph, Element, ElementMorph, Morph, Node, Value};

use crate::error::{DecompileError, Result};

#[derive(Debug, Clone)]
enum DocNode {
    // parent of every detached node
    Holder,
    Fragment,
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        element_morphs: Vec<ElementMorph>,
    },
    Text(String),
    Comment(String),
    Placeholder(Option<Morph>),
}

impl DocNode {
    fn kind_name(&self) -> &'static str {
        match self {
            DocNode::Holder => "holder",
            DocNode::Fragment => "fragment",
            DocNode::Element { .. } => "element",
            DocNode::Text(_) => "text",
            DocNode::Comment(_) => "comment",
            DocNode::Placeholder(_) => "placeholder",
        }
    }
}

#[derive(Debug, Clone)]
struct AttrSlot {
    element: NodeId,
    name: String,
    value: Option<Value>,
}

/// A morph placeholder created with `create_morph_at`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotRef(NodeId);

impl SlotRef {
    pub fn node_id(&self) -> &NodeId {
        &self.0
    }
}

/// An attribute morph created with `create_attr_morph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttrMorphRef(usize);

/// A morph created with `create_element_morph`; its parent is the element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementMorphRef(NodeId);

impl ElementMorphRef {
    pub fn element(&self) -> &NodeId {
        &self.0
    }
}

/// Render node as returned from `buildRenderNodes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MorphHandle {
    Slot(SlotRef),
    Attribute(AttrMorphRef),
    Element(ElementMorphRef),
}

impl MorphHandle {
    pub fn handle_name(&self) -> &'static str {
        match self {
            MorphHandle::Slot(_) => "placeholder morph",
            MorphHandle::Attribute(_) => "attribute morph",
            MorphHandle::Element(_) => "element morph",
        }
    }
}

impl From<SlotRef> for MorphHandle {
    fn from(v: SlotRef) -> Self {
        MorphHandle::Slot(v)
    }
}

impl From<AttrMorphRef> for MorphHandle {
    fn from(v: AttrMorphRef) -> Self {
        MorphHandle::Attribute(v)
    }
}

impl From<ElementMorphRef> for MorphHandle {
    fn from(v: ElementMorphRef) -> Self {
        MorphHandle::Element(v)
    }
}

pub struct RecordingDocument {
    tree: Tree<DocNode>,
    holder: NodeId,
    attr_morphs: Vec<AttrSlot>,
}

impl RecordingDocument {
    pub fn new() -> Result<Self> {
        let mut tree = TreeBuilder::new().build();
        let holder = tree.insert(TreeNode::new(DocNode::Holder), InsertBehavior::AsRoot)?;
        Ok(Self {
            tree,
            holder,
            attr_morphs: Vec::new(),
        })
    }

    fn detached(&mut self, node: DocNode) -> Result<NodeId> {
        let id = self
            .tree
            .insert(TreeNode::new(node), InsertBehavior::UnderNode(&self.holder))?;
        Ok(id)
    }

    fn children(&self, node: &NodeId) -> Result<Vec<NodeId>> {
        Ok(self.tree.children_ids(node)?.cloned().collect())
    }

    pub fn create_document_fragment(&mut self) -> Result<NodeId> {
        self.detached(DocNode::Fragment)
    }

    pub fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        self.detached(DocNode::Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
            element_morphs: Vec::new(),
        })
    }

    /// The namespace does not show up in the template source.
    pub fn create_element_ns(&mut self, _namespace: &str, tag: &str) -> Result<NodeId> {
        self.create_element(tag)
    }

    pub fn create_text_node(&mut self, text: &str) -> Result<NodeId> {
        self.detached(DocNode::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> Result<NodeId> {
        self.detached(DocNode::Comment(text.to_string()))
    }

    /// Moves `child` to the end of `parent`, wherever it was before.
    pub fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
        self.tree.move_node(child, MoveBehavior::ToParent(parent))?;
        Ok(())
    }

    pub fn set_attribute(&mut self, element: &NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.tree.get_mut(element)?.data_mut();
        match node {
            DocNode::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(k, _)| k == name) {
                    Some(slot) => slot.1 = value.to_string(),
                    None => attributes.push((name.to_string(), value.to_string())),
                }
                Ok(())
            }
            other => Err(DecompileError::WrongMorphKind {
                statement: "setAttribute".to_string(),
                found: other.kind_name().to_string(),
            }
            .into()),
        }
    }

    pub fn set_attribute_ns(
        &mut self,
        element: &NodeId,
        _namespace: &str,
        name: &str,
        value: &str,
    ) -> Result<()> {
        self.set_attribute(element, name, value)
    }

    pub fn child_at_index(&self, node: &NodeId, index: usize) -> Result<NodeId> {
        let children = self.tree.get(node)?.children();
        children.get(index).cloned().ok_or_else(|| {
            DecompileError::InvalidChildIndex {
                index,
                len: children.len(),
            }
            .into()
        })
    }

    /// Follows `indices` down from `node`, one level per index.
    pub fn child_at(&self, node: &NodeId, indices: &[usize]) -> Result<NodeId> {
        let mut current = node.clone();
        for index in indices {
            current = self.child_at_index(&current, *index)?;
        }
        Ok(current)
    }

    /// Replaces the inclusive child range `start..=end` of `parent` with a
    /// single placeholder. `(-1, -1)` appends the placeholder instead.
    pub fn create_morph_at(
        &mut self,
        parent: &NodeId,
        start: i64,
        end: i64,
        _contextual: Option<&NodeId>,
    ) -> Result<SlotRef> {
        let children = self.children(parent)?;

        if start == -1 && end == -1 {
            let id = self.tree.insert(
                TreeNode::new(DocNode::Placeholder(None)),
                InsertBehavior::UnderNode(parent),
            )?;
            return Ok(SlotRef(id));
        }

        let len = children.len();
        if start < 0 || end < start || end as usize >= len {
            return Err(DecompileError::InvalidMorphRange { start, end, len }.into());
        }
        let (start, end) = (start as usize, end as usize);

        for id in &children[start..=end] {
            self.tree.remove_node(id.clone(), RemoveBehavior::DropChildren)?;
        }

        let id = self.tree.insert(
            TreeNode::new(DocNode::Placeholder(None)),
            InsertBehavior::UnderNode(parent),
        )?;
        // move the trailing siblings back behind the placeholder
        for id in &children[end + 1..] {
            self.tree.move_node(id, MoveBehavior::ToParent(parent))?;
        }
        Ok(SlotRef(id))
    }

    pub fn create_unsafe_morph_at(
        &mut self,
        parent: &NodeId,
        start: i64,
        end: i64,
        contextual: Option<&NodeId>,
    ) -> Result<SlotRef> {
        self.create_morph_at(parent, start, end, contextual)
    }

    pub fn create_attr_morph(&mut self, element: &NodeId, name: &str) -> Result<AttrMorphRef> {
        // id is validated here so a stale handle fails at creation time
        self.tree.get(element)?;
        self.attr_morphs.push(AttrSlot {
            element: element.clone(),
            name: name.to_string(),
            value: None,
        });
        Ok(AttrMorphRef(self.attr_morphs.len() - 1))
    }

    pub fn create_unsafe_attr_morph(&mut self, element: &NodeId, name: &str) -> Result<AttrMorphRef> {
        self.create_attr_morph(element, name)
    }

    pub fn create_element_morph(&mut self, element: &NodeId) -> Result<ElementMorphRef> {
        self.tree.get(element)?;
        Ok(ElementMorphRef(element.clone()))
    }

    pub fn insert_boundary(&mut self, _fragment: &NodeId, _index: Option<usize>) {}

    pub fn detect_namespace(&mut self, _element: &NodeId) {}

    /// Copies `node` into a new detached node, with its subtree when `deep`.
    pub fn clone_node(&mut self, node: &NodeId, deep: bool) -> Result<NodeId> {
        let data = match self.tree.get(node)?.data() {
            DocNode::Holder => DocNode::Fragment,
            other => other.clone(),
        };
        let copy = self.detached(data)?;
        if deep {
            for child in self.children(node)? {
                let child_copy = self.clone_node(&child, true)?;
                self.tree.move_node(&child_copy, MoveBehavior::ToParent(&copy))?;
            }
        }
        Ok(copy)
    }

    pub fn slot_parent(&self, slot: &SlotRef) -> Result<NodeId> {
        let node = self.tree.get(&slot.0)?;
        node.parent().cloned().ok_or_else(|| {
            DecompileError::WrongMorphKind {
                statement: "slot parent".to_string(),
                found: "detached placeholder".to_string(),
            }
            .into()
        })
    }

    pub fn attr_morph_element(&self, morph: &AttrMorphRef) -> Result<NodeId> {
        self.attr_slot(morph).map(|slot| slot.element.clone())
    }

    fn attr_slot(&self, morph: &AttrMorphRef) -> Result<&AttrSlot> {
        self.attr_morphs.get(morph.0).ok_or_else(|| {
            DecompileError::WrongMorphKind {
                statement: "attribute".to_string(),
                found: format!("unknown attribute morph #{}", morph.0),
            }
            .into()
        })
    }

    pub fn bind_slot(&mut self, slot: &SlotRef, morph: Morph) -> Result<()> {
        match self.tree.get_mut(&slot.0)?.data_mut() {
            DocNode::Placeholder(target) => {
                *target = Some(morph);
                Ok(())
            }
            other => Err(DecompileError::WrongMorphKind {
                statement: morph.morph_name().to_string(),
                found: other.kind_name().to_string(),
            }
            .into()),
        }
    }

    pub fn bind_attribute(&mut self, morph: &AttrMorphRef, value: Value) -> Result<()> {
        self.attr_slot(morph)?;
        self.attr_morphs[morph.0].value = Some(value);
        Ok(())
    }

    pub fn push_element_morph(&mut self, element: &NodeId, morph: ElementMorph) -> Result<()> {
        match self.tree.get_mut(element)?.data_mut() {
            DocNode::Element { element_morphs, .. } => {
                element_morphs.push(morph);
                Ok(())
            }
            other => Err(DecompileError::WrongMorphKind {
                statement: "element".to_string(),
                found: other.kind_name().to_string(),
            }
            .into()),
        }
    }

    /// Converts the subtree under `root` into the immutable model.
    pub fn freeze(&self, root: &NodeId) -> Result<Node> {
        let node = self.tree.get(root)?;
        let children = node
            .children()
            .iter()
            .map(|child| self.freeze(child))
            .collect::<Result<Vec<_>>>()?;

        let frozen = match node.data() {
            DocNode::Holder | DocNode::Fragment => Node::Fragment(children),
            DocNode::Element {
                tag,
                attributes,
                element_morphs,
            } => {
                let mut attribute_morphs = Vec::new();
                for slot in self.attr_morphs.iter().filter(|s| &s.element == root) {
                    let value = slot.value.clone().ok_or_else(|| DecompileError::UnboundMorph {
                        kind: format!("attribute `{}`", slot.name),
                    })?;
                    attribute_morphs.push(AttributeMorph::new(slot.name.clone(), value));
                }
                Node::Element(Element {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                    attribute_morphs,
                    element_morphs: element_morphs.clone(),
                    children,
                })
            }
            DocNode::Text(text) => Node::text(text.clone()),
            DocNode::Comment(text) => Node::comment(text.clone()),
            DocNode::Placeholder(morph) => match morph {
                Some(morph) => Node::morph(morph.clone()),
                None => {
                    return Err(DecompileError::UnboundMorph {
                        kind: "placeholder".to_string(),
                    }
                    .into())
                }
            },
        };
        Ok(frozen)
    }
}
