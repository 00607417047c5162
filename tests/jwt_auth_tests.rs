// SPDX-License-Identifier: MIT

//! JWT creation and validation tests.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use trident_services::middleware::auth::{create_jwt, Claims};

const KEY: &[u8] = b"test_signing_key_for_jwt_tests_only";

#[test]
fn test_jwt_round_trip() {
    let token = create_jwt("U1", "u1@example.com", KEY).unwrap();

    let data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(KEY),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap();

    assert_eq!(data.claims.sub, "U1");
    assert_eq!(data.claims.email, "u1@example.com");
    assert!(data.claims.exp > data.claims.iat);
}

#[test]
fn test_jwt_expiry_is_thirty_days() {
    let token = create_jwt("U1", "u1@example.com", KEY).unwrap();

    let data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(KEY),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap();

    assert_eq!(data.claims.exp - data.claims.iat, 30 * 24 * 60 * 60);
}

#[test]
fn test_jwt_rejected_with_wrong_key() {
    let token = create_jwt("U1", "u1@example.com", KEY).unwrap();

    let result = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(b"a_completely_different_key"),
        &Validation::new(Algorithm::HS256),
    );

    assert!(result.is_err());
}

#[test]
fn test_jwt_rejected_with_wrong_algorithm() {
    let token = create_jwt("U1", "u1@example.com", KEY).unwrap();

    let result = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(KEY),
        &Validation::new(Algorithm::HS384),
    );

    assert!(result.is_err());
}
