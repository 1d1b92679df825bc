// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message fixtures shared by the crates' tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use serde_json::{json, Value};

/// `data` of a START command as the UI sends it, with caller-supplied integrity fields.
pub fn start_data(train_id: &str, hash: &str, hash_signed: &str) -> Value {
    json!({
        "userId": 99999999,
        "trainId": train_id,
        "proposalId": 9999,
        "stations": ["tb-test-station-1", "tb-test-station-2", "tb-test-station-3"],
        "files": ["test_train/entrypoint.py", "test_train/requirements.txt"],
        "masterImage": "python/base",
        "entrypointExecutable": "python",
        "entrypointPath": "test_train/entrypoint.py",
        "sessionId": "8203c4facff907d3bd83f8399e9a97aa",
        "hash": hash,
        "hashSigned": hash_signed,
        "query": {"resource": "Patient", "filename": "query.json"},
        "user_he_key": "12345241"
    })
}

/// Full envelope around `data`.
pub fn envelope(kind: &str, data: Value) -> Value {
    json!({
        "id": "f54f58d9-58a1-4141-9dfb-a48b2a275998",
        "type": kind,
        "data": data,
        "metadata": {}
    })
}

/// Serialized START message.
pub fn start_message(train_id: &str, hash: &str, hash_signed: &str) -> Vec<u8> {
    envelope("trainBuildStart", start_data(train_id, hash, hash_signed)).to_string().into_bytes()
}

/// Serialized STOP or STATUS message for `train_id`.
pub fn train_message(kind: &str, train_id: &str) -> Vec<u8> {
    envelope(kind, json!({ "trainId": train_id })).to_string().into_bytes()
}

/// Hex of a PEM (SPKI) RSA-2048 public key, stored the way Vault holds `rsa_public_key`.
pub const USER_PUBLIC_KEY: &str = "2d2d2d2d2d424547494e205055424c4943204b45592d2d2d2d2d0a4d494942496a414e42676b71686b6947397730424151454641414f43415138414d49494243674b4341514541346c6141424a70463674747758564a56314435380a756578374647317749516c6e7a7879477a304f693035724f324d5363784d73476672724e5671344b712b4e3365696247385a52554a4f3632334574474c6654780a6b4372494d4365386948416f5356787872754f594f6172506b797554777159382f6733787051392f4a344a503158455962503366612f574152314a322f6b48410a647a486e67692b6a68526561566a4a55494557622b57522f6155353059774e446f62706c2f3333616d7544564d757965325043766a72716437615266736972430a634a6b56694f5635484c366e4966672f72394f63472b3556567246736474594e586b4e6847546653586b4c714d79504d7a6934445a7a726b5a46384d424d74500a4f534e6275745047356e3264674f6e432b336165346f524270447971524f6d455a6633594269306f6a4e4d4f6e586963624f556958306c70777235527279486a0a4e774944415141420a2d2d2d2d2d454e44205055424c4943204b45592d2d2d2d2d0a";

/// SHA-512 train hash the user signed.
pub const TRAIN_HASH: &str = "ecb6d6aacb8d3ca10d37b9a7fa45caa3e486d16ba3826a99faffa14e1c2b8b6a66ff5c2cf24cbd53dd2a475d0520522f3a8ef1e63048dfc202c8e8f7203d12a4";

/// RSA-PSS (SHA-512, MGF1 SHA-512, maximum salt) signature of [`TRAIN_HASH`] by [`USER_PUBLIC_KEY`].
pub const TRAIN_HASH_SIGNED: &str = "0686ac5d6761bac8e8e70d2d4b75129cf948cc5b960c331d7f55f97c2554e14dcd79dd327c06a11c682c86f94c5d7f2e684f45c3b9d745cb026316bbd56bea52f2446d2aad7802c2206e8ff098044b336825f680eb18bdccebe56d920c2cbfb02adffd55ad4873f36f04daae54f4f08fa028273ff549e71a21895c05287106515ffb29e017dac7c88a0514ecff04f84626707988e206656d4b6ae5bbb78897c959a3b872015c3e8ce47e19961cd86b8a2cb944c7f4fc308da2a5ee13b9578e6af3c1abe56d59bee26968086c2d12dc28b3326d6f9aa0661870a6e285119105bf3376d1a56de451a9bcd2676cfe0ffbb5b72c091cc4fbd9f5e53a5dc3720d5e6d";

/// Signature of [`TRAIN_HASH`] by an unrelated RSA-2048 key.
pub const FORGED_HASH_SIGNED: &str = "64b481eb2157e2f3592e0fb3cf7764f6446b4924c0780a9f7d85c7682e9482abc729dab60522220d412afa18e27bacf6b33d5de0522622ba3d77e2d37ff9aec5e987158df5f3772e4ad2ced3648a0d72b7259250c6f8d039e3d87067b13f482cbaa95beabbafb7a789052486bcc68b278ac723b639ade076850393f0fc769232086ca6cb5635068c1bb5eefd7441b9e94ceb205025320f64c547941966b52ddfd3186d7895966b7e0137a6a64488deb2d81bedb180b84d32e70b2d7e2ba9178269eb91ad7ad4307a8535c79be4cdbc55e613570bb18051c487c573e1639327e78cbac61efd656917558cea26048cd9ea72420a249cabd58ef1b603bf0efc0f2c";

/// START message whose integrity fields verify against [`USER_PUBLIC_KEY`].
pub fn signed_start_message(train_id: &str) -> Vec<u8> {
    start_message(train_id, TRAIN_HASH, TRAIN_HASH_SIGNED)
}
