use std::fmt;

use url::Url;

/// Composite identity of a pull request, used as the grace-window key that
/// suppresses repeated auto-splits of the same PR.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrKey {
    /// Scheme + host origin, e.g. `https://github.com`.
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/pull/{}",
            self.host, self.owner, self.repo, self.number
        )
    }
}

/// A recognized pull-request conversation URL together with the derived
/// companion "files changed" URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrLink {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub files_url: String,
}

impl PrLink {
    pub fn key(&self) -> PrKey {
        PrKey {
            host: self.host.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            number: self.number,
        }
    }
}

/// Recognizes a pull-request conversation URL on one of the allowed hosts.
///
/// The path must be exactly `/owner/repo/pull/<digits>` with at most one
/// trailing slash. Deeper paths (`/pull/N/files`, `/pull/N/commits`) never
/// match, so the engine cannot re-trigger on the files tab it opens itself.
/// Returns `None` on parse failure.
pub fn match_pr_url(url: &str, allowed_hosts: &[String]) -> Option<PrLink> {
    let parsed = Url::parse(url).ok()?;
    let hostname = parsed.host_str()?;
    if !allowed_hosts.iter().any(|allowed| allowed == hostname) {
        return None;
    }

    let mut segments: Vec<&str> = parsed.path_segments()?.collect();
    // An optional trailing slash surfaces as one trailing empty segment.
    if segments.last() == Some(&"") {
        segments.pop();
    }
    let &[owner, repo, literal, number] = segments.as_slice() else {
        return None;
    };
    if literal != "pull" || owner.is_empty() || repo.is_empty() {
        return None;
    }
    if number.is_empty() || !number.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let number = number.parse::<u64>().ok()?;

    let origin = parsed.origin().ascii_serialization();
    let files_url = format!("{origin}/{owner}/{repo}/pull/{number}/files");
    Some(PrLink {
        host: origin,
        owner: owner.to_owned(),
        repo: repo.to_owned(),
        number,
        files_url,
    })
}
