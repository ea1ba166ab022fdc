//! Integration test: properties of created paths and rejection of bad input.
//!
//! - byte-identical output for identical inputs
//! - the framed payload length prefix matches the payload exactly
//! - every single-bit flip of a sealed payload fails authentication
//! - the entry hop must not apply the blinding tweak, later hops must
//! - a relay with the wrong key learns nothing

mod common;

use common::{onion_for, path_of, random_nodes, seed, Node};
use shroud_blinding::session::OsSessionKeys;
use shroud_blinding::{create_path, create_path_with_seed, unwrap_onion, BlindedPath, BlindingError, ProtocolError, UnwrapOutcome};
use shroud_crypto::secp::Point;
use shroud_sphinx::packet::OnionPacket;
use shroud_wire::bigsize;
use shroud_wire::onionmsg::OnionMsgPayload;
use shroud_wire::tlv::TlvRecord;

fn fixed_nodes(n: u8) -> Vec<Node> {
    (1..=n).map(|b| Node::from_seed(b + 0x30)).collect()
}

/// Replace hop `i`'s sealed payload with `enctlv`.
fn with_enctlv(path: &BlindedPath, i: usize, enctlv: Vec<u8>) -> BlindedPath {
    let mut path = path.clone();
    let outer = OnionMsgPayload {
        enctlv: Some(enctlv.clone()),
        ..Default::default()
    };
    path.hops[i].payload = outer.to_wire().expect("encode");
    path.hops[i].encrypted_payload = enctlv;
    path
}

/// Forward the onion through hops `0..i` and return what hop `i` receives.
fn advance_to(nodes: &[Node], path: &BlindedPath, i: usize) -> (OnionPacket, Point) {
    let mut onion = onion_for(path);
    let mut blinding = path.blinding;
    for (j, node) in nodes.iter().enumerate().take(i) {
        match unwrap_onion(&node.key, &onion, &blinding, j == 0).expect("earlier hop") {
            UnwrapOutcome::Forward {
                next_blinding,
                next_onion,
                ..
            } => {
                onion = next_onion;
                blinding = next_blinding;
            }
            UnwrapOutcome::Terminal => panic!("hop {j} terminated early"),
        }
    }
    (onion, blinding)
}

#[test]
fn test_determinism() {
    let nodes = fixed_nodes(4);
    let a = create_path_with_seed(&path_of(&nodes), seed(0x06)).expect("create");
    let b = create_path_with_seed(&path_of(&nodes), seed(0x06)).expect("create");
    assert_eq!(a, b);
    for (x, y) in a.hops.iter().zip(&b.hops) {
        assert_eq!(x.framed_payload(), y.framed_payload());
    }
}

#[test]
fn test_length_prefix_matches_payload() {
    for n in 1..=5 {
        let nodes = random_nodes(n);
        let path = create_path(&path_of(&nodes), &mut OsSessionKeys).expect("create");
        for (i, hop) in path.hops.iter().enumerate() {
            let framed = hop.framed_payload();
            let mut cursor = framed.as_slice();
            let declared = bigsize::read(&mut cursor).expect("prefix");
            assert_eq!(declared as usize, cursor.len(), "hop {i} of {n}");

            let outer = OnionMsgPayload::from_wire(cursor).expect("decode");
            if i == n - 1 {
                assert!(outer.enctlv.is_none());
                assert!(cursor.is_empty());
            } else {
                assert_eq!(outer.enctlv.as_deref(), Some(hop.encrypted_payload.as_slice()));
            }
        }
    }
}

#[test]
fn test_every_bit_flip_fails_authentication() {
    let nodes = fixed_nodes(3);
    let path = create_path_with_seed(&path_of(&nodes), seed(0x06)).expect("create");

    for hop in 0..2 {
        let sealed = path.hops[hop].encrypted_payload.clone();
        for bit in 0..sealed.len() * 8 {
            let mut tampered = sealed.clone();
            tampered[bit / 8] ^= 1 << (bit % 8);
            let bad_path = with_enctlv(&path, hop, tampered);
            let (onion, blinding) = advance_to(&nodes, &bad_path, hop);
            let err = unwrap_onion(&nodes[hop].key, &onion, &blinding, hop == 0)
                .expect_err("tampered payload accepted");
            assert!(
                matches!(err, BlindingError::Protocol(ProtocolError::AuthFailure)),
                "hop {hop} bit {bit}: {err}"
            );
        }
    }
}

#[test]
fn test_truncated_enctlv_rejected() {
    let nodes = fixed_nodes(2);
    let path = create_path_with_seed(&path_of(&nodes), seed(0x06)).expect("create");
    let bad_path = with_enctlv(&path, 0, vec![0u8; 10]);
    let onion = onion_for(&bad_path);
    let err = unwrap_onion(&nodes[0].key, &onion, &bad_path.blinding, true).expect_err("short");
    assert!(matches!(
        err,
        BlindingError::Protocol(ProtocolError::EncryptedFieldTooShort { len: 10 })
    ));
}

#[test]
fn test_first_hop_exception() {
    let nodes = random_nodes(3);
    let path = create_path(&path_of(&nodes), &mut OsSessionKeys).expect("create");
    let onion = onion_for(&path);

    let err = unwrap_onion(&nodes[0].key, &onion, &path.blinding, false).expect_err("tweaked entry");
    assert!(matches!(err, BlindingError::Protocol(ProtocolError::OnionRejected(_))));

    let (onion, blinding) = advance_to(&nodes, &path, 1);
    let err = unwrap_onion(&nodes[1].key, &onion, &blinding, true).expect_err("untweaked relay");
    assert!(matches!(err, BlindingError::Protocol(ProtocolError::OnionRejected(_))));
    assert!(unwrap_onion(&nodes[1].key, &onion, &blinding, false).is_ok());
}

#[test]
fn test_wrong_key_rejected() {
    let nodes = random_nodes(3);
    let path = create_path(&path_of(&nodes), &mut OsSessionKeys).expect("create");
    let onion = onion_for(&path);
    let stranger = Node::random();

    let err = unwrap_onion(&stranger.key, &onion, &path.blinding, true).expect_err("stranger");
    assert!(matches!(err, BlindingError::Protocol(ProtocolError::OnionRejected(_))));
    assert!(!err.is_invariant_violation());

    // hop 1's key at hop 0
    let err = unwrap_onion(&nodes[1].key, &onion, &path.blinding, false).expect_err("wrong hop");
    assert!(matches!(err, BlindingError::Protocol(ProtocolError::OnionRejected(_))));
}

#[test]
fn test_wrong_blinding_point_rejected() {
    let nodes = random_nodes(3);
    let path = create_path(&path_of(&nodes), &mut OsSessionKeys).expect("create");
    let (onion, _) = advance_to(&nodes, &path, 1);
    let err = unwrap_onion(&nodes[1].key, &onion, &path.blinding, false).expect_err("stale blinding");
    assert!(matches!(err, BlindingError::Protocol(ProtocolError::OnionRejected(_))));
}
