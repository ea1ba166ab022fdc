//! `create` and `unwrap`.
//!
//! Both return the full stdout text so nothing is printed unless the whole
//! command succeeds.

use anyhow::Context;
use shroud_blinding::session::OsSessionKeys;
use shroud_blinding::{create_path, unwrap_onion_bytes, BlindedPath, BlindingError, PathHop};
use shroud_crypto::secp::{Point, Scalar};
use tracing::info;

use crate::config::{CreateConfig, SessionKeyMode};
use crate::output;

pub fn create(hops: &[String], config: &CreateConfig) -> anyhow::Result<String> {
    let path = hops
        .iter()
        .enumerate()
        .map(|(i, token)| token.parse::<PathHop>().with_context(|| format!("node {}", i + 1)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let blinded = match config.session_key {
        SessionKeyMode::Random => create_path(&path, &mut OsSessionKeys)?,
        SessionKeyMode::Fixed => create_fixed(&path)?,
    };
    info!(hops = blinded.hops.len(), "created blinded path");
    Ok(output::render_path(&blinded))
}

#[cfg(feature = "fixed-seed")]
fn create_fixed(path: &[PathHop]) -> anyhow::Result<BlindedPath> {
    use shroud_blinding::session::FixedSessionKey;

    tracing::warn!("using the fixed session key; output is not private");
    Ok(create_path(path, &mut FixedSessionKey::default())?)
}

#[cfg(not(feature = "fixed-seed"))]
fn create_fixed(_: &[PathHop]) -> anyhow::Result<BlindedPath> {
    anyhow::bail!("session_key = \"fixed\" requires a build with the fixed-seed feature")
}

pub fn unwrap(privkey: &str, onion: &str, blinding: &str, first_node: bool) -> anyhow::Result<String> {
    let node_key = Scalar::from_hex(privkey)
        .map_err(BlindingError::from)
        .context("private key")?;
    let onion = hex::decode(onion)
        .map_err(|e| BlindingError::Argument(e.to_string()))
        .context("onion")?;
    let blinding = Point::from_hex(blinding)
        .map_err(BlindingError::from)
        .context("blinding point")?;

    let outcome = unwrap_onion_bytes(&node_key, &onion, &blinding, first_node)?;
    Ok(output::render_unwrap(&outcome))
}
