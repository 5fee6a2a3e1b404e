//! Task explanations for the `shipkit explain` and `shipkit list-tasks`
//! commands.

/// Information about one convenience target.
#[derive(Debug, Clone)]
pub struct TaskExplanation {
    /// Short key for the task (user-facing, e.g. "cov").
    pub key: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// What the task does.
    pub description: &'static str,
    /// One line per step, in execution order.
    pub steps: &'static [&'static str],
}

/// Registry of all tasks, in the order they are listed.
pub static TASK_REGISTRY: &[TaskExplanation] = &[
    TaskExplanation {
        key: "cov",
        title: "Coverage",
        description: r#"Runs the test suite under the coverage runner and writes the HTML
report into the artifacts directory.

The command line is glue over an external tool; replace it wholesale with
`[cov] command = [...]` in shipkit.toml to use a different runner."#,
        steps: &["cov: run the coverage command (default: cargo tarpaulin)"],
    },
    TaskExplanation {
        key: "docs",
        title: "Documentation",
        description: r#"Builds the API documentation and opens the result in the browser.

The open step resolves the rustdoc index from the root package name and can
be disabled with `--no-open` or `[docs] open = false`."#,
        steps: &[
            "doc: run the docs builder (default: cargo doc --no-deps)",
            "open: open the built index with the system handler",
        ],
    },
    TaskExplanation {
        key: "publish",
        title: "Publish",
        description: r#"Packages the crate, uploads it to the registry, and removes the
packaging staging directory afterwards.

Publishing refuses to run from a dirty working tree unless `--allow-dirty`
(or `[publish] allow_dirty = true`) is set; a refusal blocks every step and
exits with code 2. The sha256 of the produced .crate file is recorded in the
run receipt before the staging directory is removed."#,
        steps: &[
            "package: build the distributable package (default: cargo package)",
            "publish: upload to the registry (default: cargo publish)",
            "clean: remove the packaging staging directory",
        ],
    },
];

/// Look up a task by key, tolerating case and `-`/`_` variations.
pub fn lookup_task(key: &str) -> Option<&'static TaskExplanation> {
    let normalized = key.to_ascii_lowercase().replace('_', "-");
    TASK_REGISTRY.iter().find(|t| t.key == normalized)
}

/// All registry keys, in listing order.
pub fn list_task_keys() -> Vec<&'static str> {
    TASK_REGISTRY.iter().map(|t| t.key).collect()
}
