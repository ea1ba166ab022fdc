//! Text rendering of command results.

use std::fmt::Write;

use shroud_blinding::{BlindedHop, BlindedPath, UnwrapOutcome};

/// `<blinded id hex>/<bigsize length hex><payload hex>`.
pub fn hop_token(hop: &BlindedHop) -> String {
    format!("{}/{}", hop.blinded_node_id, hex::encode(hop.framed_payload()))
}

/// ```text
/// Blinding: <hex>
/// <token> <token> ...
/// ```
pub fn render_path(path: &BlindedPath) -> String {
    let tokens: Vec<String> = path.hops.iter().map(hop_token).collect();
    format!("Blinding: {}\n{}\n", path.blinding, tokens.join(" "))
}

pub fn render_unwrap(outcome: &UnwrapOutcome) -> String {
    match outcome {
        UnwrapOutcome::Terminal => "TERMINAL\n".to_string(),
        UnwrapOutcome::Forward {
            contents,
            next_blinding,
            next_onion,
        } => {
            let mut out = String::new();
            // Writing to a String cannot fail.
            let _ = writeln!(out, "Contents: {}", hex::encode(contents));
            let _ = writeln!(out, "Next blinding: {next_blinding}");
            let _ = writeln!(out, "Next onion: {}", hex::encode(next_onion.serialize()));
            out
        }
    }
}
