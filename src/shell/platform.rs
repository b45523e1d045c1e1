//! Platform detection.

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "BUILDKITE", "JENKINS_URL"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}
