use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::bucket::{self, Bucketer, Sha256Bucketer};
use crate::version;

/// The update terms of one active release.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseTerms<'a> {
    /// Version offered by this release.
    pub version: &'a str,
    /// Lowest client version allowed to keep operating.
    pub minimum: &'a str,
    /// Fraction of non-whitelisted identifiers offered the update, 0..=100.
    pub rollout_percent: i32,
}

/// What the caller told us about itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Client<'a> {
    pub identifier: Option<&'a str>,
    pub version: Option<&'a str>,
}

/// The eligibility verdict for one client against one release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub in_whitelist: bool,
    pub in_rollout: bool,
    pub must_update: bool,
    pub optional_update: bool,
}

/// Pure eligibility resolver. Stateless apart from the bucketing strategy;
/// identical inputs always produce identical verdicts.
#[derive(Clone)]
pub struct Resolver {
    bucketer: Arc<dyn Bucketer>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Arc::new(Sha256Bucketer))
    }
}

impl Resolver {
    pub fn new(bucketer: Arc<dyn Bucketer>) -> Self {
        Self { bucketer }
    }

    /// Decides whether the client must or may update.
    ///
    /// A client below the release minimum is always forced to update,
    /// regardless of whitelist or rollout. Otherwise whitelist membership
    /// and rollout inclusion each independently offer the update to clients
    /// behind the release version. Without a client version only the
    /// optional signal can be derived.
    pub fn resolve<S: AsRef<str>>(
        &self,
        terms: &ReleaseTerms,
        whitelist: &[S],
        client: &Client,
    ) -> Verdict {
        // An empty identifier is an anonymous caller, same as no identifier.
        let identifier = client.identifier.filter(|id| !id.is_empty());

        let in_whitelist = is_whitelisted(identifier, whitelist);
        let in_rollout =
            bucket::in_rollout(self.bucketer.as_ref(), identifier, terms.rollout_percent);

        let mut must_update = false;
        let mut optional_update = false;

        match client.version {
            Some(client_version) => {
                if version::compare(client_version, terms.minimum) == Ordering::Less {
                    must_update = true;
                } else {
                    let behind =
                        version::compare(client_version, terms.version) == Ordering::Less;
                    if (in_whitelist || in_rollout) && behind {
                        optional_update = true;
                    }
                }
            }
            None => {
                optional_update = in_whitelist || in_rollout;
            }
        }

        Verdict {
            in_whitelist,
            in_rollout,
            must_update,
            optional_update,
        }
    }
}

/// Exact, case-sensitive membership check. An absent identifier never
/// matches anything.
fn is_whitelisted<S: AsRef<str>>(identifier: Option<&str>, whitelist: &[S]) -> bool {
    match identifier {
        None => false,
        Some(id) => whitelist.iter().any(|entry| entry.as_ref() == id),
    }
}
