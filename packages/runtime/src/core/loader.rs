use log::debug;
use shave_template::{parser::parse_revision, RenderOptions};

use crate::{
    artifact::Artifact,
    core::{hooks, opcodes},
    error::{DecompileError, Result},
};

/// Picks the interpreter from the artifact's revision and serializes the
/// recovered tree.
pub fn decompile_artifact(artifact: &Artifact, options: &RenderOptions) -> Result<String> {
    let revision = artifact
        .revision_marker()
        .ok_or_else(|| DecompileError::invalid_artifact("revision", "is missing"))?;

    let unsupported = || DecompileError::UnsupportedVersion {
        revision: revision.to_string(),
    };
    let major = parse_revision(revision).map_err(|_| unsupported())?.major;
    debug!("decompiling `{revision}` template (major version {major})");

    let root = match major {
        1 => hooks::render(artifact)?,
        2 => opcodes::render(artifact)?,
        _ => return Err(unsupported().into()),
    };
    Ok(root.render(0, options))
}
