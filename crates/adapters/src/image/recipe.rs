// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt::Write;

/// Directory holding the train's code inside the image.
pub const TRAIN_DIR: &str = "/opt/pht_train";

/// Directory stations write results into.
pub const RESULTS_DIR: &str = "/opt/pht_results";

/// Render the build recipe for a train image.
///
/// The entrypoint is resolved under [`TRAIN_DIR`]; leading `./` and `/`
/// are dropped, so an absolute path still lands inside it. With no arguments
/// the `CMD` array holds only the command and the entrypoint.
pub fn render_recipe(
    base_image: &str,
    command: &str,
    args: Option<&[String]>,
    entrypoint: &str,
) -> String {
    let mut entrypoint = entrypoint;
    loop {
        if let Some(rest) = entrypoint.strip_prefix("./") {
            entrypoint = rest;
        } else if let Some(rest) = entrypoint.strip_prefix('/') {
            entrypoint = rest;
        } else {
            break;
        }
    }

    let mut cmd = vec![quote(command)];
    cmd.extend(args.unwrap_or_default().iter().map(|a| quote(a)));
    cmd.push(quote(&format!("{}/{}", TRAIN_DIR, entrypoint)));

    let mut recipe = String::new();
    let _ = writeln!(recipe, "FROM {}", base_image);
    // Trailing space on the RUN line is part of the expected output
    let _ = writeln!(
        recipe,
        "RUN mkdir {train} && mkdir {results} && chmod -R +x {train} ",
        train = TRAIN_DIR,
        results = RESULTS_DIR
    );
    let _ = writeln!(recipe, "CMD [{}]", cmd.join(", "));
    recipe
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

#[cfg(test)]
#[path = "recipe_tests.rs"]
mod tests;
