//! Repository URL resolution.

use crate::error::{GitHookError, Result};
use reqwest::Url;

/// Where a repository lives on its git host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocation {
    /// `scheme://host[:port]`, no trailing slash
    pub base_url: String,
    pub owner: String,
    pub project: String,
}

/// Split a repository web URL into base URL, owner and project.
///
/// Empty path segments are skipped and segments past the second are ignored.
/// A `.git` suffix on the project is dropped.
///
/// # Errors
/// Returns `MalformedUrl` if the URL does not parse, has no host, or has
/// fewer than two path segments.
///
/// # Example
///
/// ```
/// use githook_controller::hook::resolve_repository_url;
///
/// let location = resolve_repository_url("https://gitlab.com/acme/widgets").unwrap();
/// assert_eq!(location.base_url, "https://gitlab.com");
/// assert_eq!(location.owner, "acme");
/// assert_eq!(location.project, "widgets");
/// ```
pub fn resolve_repository_url(raw: &str) -> Result<RepositoryLocation> {
    let url = Url::parse(raw.trim()).map_err(|e| GitHookError::malformed_url(raw, e.to_string()))?;

    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| GitHookError::malformed_url(raw, "missing host"))?;
    let base_url = match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    };

    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty());
    let (Some(owner), Some(project)) = (segments.next(), segments.next()) else {
        return Err(GitHookError::malformed_url(
            raw,
            "expected a path of the form /<owner>/<project>",
        ));
    };

    let owner = decode(raw, owner)?;
    let project = decode(raw, project)?;
    let project = project.strip_suffix(".git").unwrap_or(&project).to_string();
    if project.is_empty() {
        return Err(GitHookError::malformed_url(raw, "empty project name"));
    }

    Ok(RepositoryLocation {
        base_url,
        owner,
        project,
    })
}

fn decode(raw: &str, segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| GitHookError::malformed_url(raw, format!("invalid path segment: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(base_url: &str, owner: &str, project: &str) -> RepositoryLocation {
        RepositoryLocation {
            base_url: base_url.to_string(),
            owner: owner.to_string(),
            project: project.to_string(),
        }
    }

    #[test]
    fn test_resolves_owner_and_project() {
        assert_eq!(
            resolve_repository_url("https://gitlab.com/acme/widgets").unwrap(),
            location("https://gitlab.com", "acme", "widgets")
        );
    }

    #[test]
    fn test_keeps_explicit_port() {
        assert_eq!(
            resolve_repository_url("http://gogs.internal:3000/team/infra").unwrap(),
            location("http://gogs.internal:3000", "team", "infra")
        );
    }

    #[test]
    fn test_strips_git_suffix_and_trailing_slash() {
        assert_eq!(
            resolve_repository_url("https://github.com/acme/widgets.git").unwrap(),
            location("https://github.com", "acme", "widgets")
        );
        assert_eq!(
            resolve_repository_url("https://github.com/acme/widgets/").unwrap(),
            location("https://github.com", "acme", "widgets")
        );
    }

    #[test]
    fn test_ignores_extra_segments() {
        assert_eq!(
            resolve_repository_url("https://github.com/acme/widgets/tree/main").unwrap(),
            location("https://github.com", "acme", "widgets")
        );
    }

    #[test]
    fn test_decodes_percent_encoded_segments() {
        assert_eq!(
            resolve_repository_url("https://gogs.example.com/my%20team/infra").unwrap(),
            location("https://gogs.example.com", "my team", "infra")
        );
    }

    #[test]
    fn test_single_segment_is_malformed() {
        let err = resolve_repository_url("https://gitlab.com/acme").unwrap_err();
        assert!(matches!(err, GitHookError::MalformedUrl { ref url, .. } if url == "https://gitlab.com/acme"));
    }

    #[test]
    fn test_unparsable_and_hostless_urls_are_malformed() {
        for raw in ["not a url", "", "mailto:dev@acme.io", "https://github.com/acme/.git"] {
            assert!(
                matches!(resolve_repository_url(raw), Err(GitHookError::MalformedUrl { .. })),
                "{raw} should be rejected"
            );
        }
    }
}
