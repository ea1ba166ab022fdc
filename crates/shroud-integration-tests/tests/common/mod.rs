//! Shared fixtures: synthetic nodes and onion wrapping.

#![allow(dead_code)]

use shroud_blinding::{BlindedPath, PathHop};
use shroud_crypto::secp::{Point, Scalar};
use shroud_sphinx::construct::{build_packet, SphinxHop};
use shroud_sphinx::packet::OnionPacket;

/// A node with its real key pair.
pub struct Node {
    pub key: Scalar,
    pub id: Point,
}

impl Node {
    pub fn random() -> Self {
        let key = Scalar::random(&mut rand::thread_rng());
        let id = key.public_key();
        Self { key, id }
    }

    pub fn from_seed(seed: u8) -> Self {
        let key = Scalar::from_bytes(&[seed; 32]).expect("scalar");
        let id = key.public_key();
        Self { key, id }
    }
}

pub fn random_nodes(n: usize) -> Vec<Node> {
    (0..n).map(|_| Node::random()).collect()
}

pub fn path_of(nodes: &[Node]) -> Vec<PathHop> {
    nodes.iter().map(|n| PathHop::new(n.id)).collect()
}

pub fn seed(b: u8) -> Scalar {
    Scalar::from_bytes(&[b; 32]).expect("scalar")
}

/// Wrap the path's hop payloads in an onion addressed to the blinded ids.
pub fn onion_for(path: &BlindedPath) -> OnionPacket {
    let hops: Vec<SphinxHop> = path
        .hops
        .iter()
        .map(|h| SphinxHop {
            pubkey: h.blinded_node_id,
            raw_payload: h.framed_payload(),
        })
        .collect();
    let session = Scalar::random(&mut rand::thread_rng());
    build_packet(&hops, &session, &[]).expect("build onion")
}
