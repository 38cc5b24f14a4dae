//! Retention pruning
//!
//! Given the remote listing of stamped siblings, decide which deployments
//! to retire. Selection is a pure function over the listing text so the
//! policy is testable without a server.
//!
//! Ordering is defined by the stamp embedded in the directory name, not by
//! filesystem modification time: a fresh clone resets mtimes, while stamps
//! are sortable by construction.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::plan::{DeployPlan, STAMP_FORMAT};

/// Deployments to delete for a keep-count of `keep_total` (the retention
/// count plus one: the just-activated directory is always reserved).
///
/// Candidates are the listing lines carrying the `{stable_path}-` prefix
/// followed by a well-formed stamp, minus the attempt's own stamped path;
/// the oldest surplus entries are returned oldest-first. Lines without the
/// prefix, and siblings whose suffix is not a stamp (operator-created
/// backups and the like), are ignored entirely: they are never deleted and
/// never occupy a keep slot.
pub fn select_victims(listing: &str, plan: &DeployPlan, keep_total: usize) -> Vec<String> {
    let prefix = format!("{}-", path_str(&plan.stable_path));
    let current = path_str(&plan.stamped_path);

    let mut candidates: Vec<&str> = listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| line.starts_with(&prefix))
        .filter(|line| is_stamp(&line[prefix.len()..]))
        .filter(|line| **line != current)
        .collect();

    // Identical prefixes, so comparing whole paths compares stamps.
    candidates.sort_unstable();
    candidates.dedup();

    // The current deployment occupies one keep slot whether or not the
    // listing included it.
    let keep_old = keep_total.saturating_sub(1);
    let surplus = candidates.len().saturating_sub(keep_old);

    candidates[..surplus].iter().map(|s| s.to_string()).collect()
}

/// True when `suffix` is exactly one stamp. chrono tolerates variable-width
/// fields, so the fixed length is checked too or lexicographic ordering
/// would not hold.
fn is_stamp(suffix: &str) -> bool {
    suffix.len() == 19 && NaiveDateTime::parse_from_str(suffix, STAMP_FORMAT).is_ok()
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Instance, DEFAULT_CLONE_DIR_FORMAT};

    fn plan_with_stamp(stamp: &str) -> DeployPlan {
        let instance: Instance = toml::from_str(
            r#"
name = "site"
branch = "main"
repository = "git@example.com:org/site.git"
servers = ["a", "b"]
server_user = "deploy"
code_path = "/srv"
venv_python_path = "/usr/bin/python3"
settings_module = "settings"
requirements = "requirements.txt"
"#,
        )
        .unwrap();
        DeployPlan::derive("production", &instance, stamp, DEFAULT_CLONE_DIR_FORMAT)
    }

    const LISTING: &str = "\
/srv/site-main-2026-08-01-00-00-00
/srv/site-main-2026-08-02-00-00-00
/srv/site-main-2026-08-03-00-00-00
/srv/site-main-2026-08-29-12-00-00
";

    #[test]
    fn test_deletes_exactly_the_oldest_surplus() {
        let plan = plan_with_stamp("2026-08-29-12-00-00");
        // retention 2 -> keep 3 including the new one
        let victims = select_victims(LISTING, &plan, 3);
        assert_eq!(victims, vec!["/srv/site-main-2026-08-01-00-00-00"]);
    }

    #[test]
    fn test_never_selects_the_current_deployment() {
        let plan = plan_with_stamp("2026-08-29-12-00-00");
        // keep_total 1: retire every prior deployment, never the new one
        let victims = select_victims(LISTING, &plan, 1);
        assert_eq!(
            victims,
            vec![
                "/srv/site-main-2026-08-01-00-00-00",
                "/srv/site-main-2026-08-02-00-00-00",
                "/srv/site-main-2026-08-03-00-00-00",
            ]
        );
    }

    #[test]
    fn test_under_quota_deletes_nothing() {
        let plan = plan_with_stamp("2026-08-29-12-00-00");
        assert!(select_victims(LISTING, &plan, 10).is_empty());
    }

    #[test]
    fn test_oldest_first_order() {
        let plan = plan_with_stamp("2026-08-29-12-00-00");
        // Shuffled listing still comes back oldest-first
        let shuffled = "\
/srv/site-main-2026-08-03-00-00-00
/srv/site-main-2026-08-01-00-00-00
/srv/site-main-2026-08-29-12-00-00
/srv/site-main-2026-08-02-00-00-00
";
        let victims = select_victims(shuffled, &plan, 2);
        assert_eq!(
            victims,
            vec![
                "/srv/site-main-2026-08-01-00-00-00",
                "/srv/site-main-2026-08-02-00-00-00",
            ]
        );
    }

    #[test]
    fn test_unrelated_lines_ignored() {
        let plan = plan_with_stamp("2026-08-29-12-00-00");
        let listing = "\
/srv/site-main
/srv/other-app-2026-01-01-00-00-00
/srv/site-main-2026-08-01-00-00-00

/srv/site-main-2026-08-29-12-00-00
";
        // The stable symlink, foreign paths, and blank lines never qualify
        let victims = select_victims(listing, &plan, 1);
        assert_eq!(victims, vec!["/srv/site-main-2026-08-01-00-00-00"]);
    }

    #[test]
    fn test_non_stamp_suffix_never_selected() {
        let plan = plan_with_stamp("2026-08-29-12-00-00");
        let listing = "\
/srv/site-main-0-notes
/srv/site-main-2026-08-01-00-00-00
/srv/site-main-2026-08-29-12-00-00
";
        // A prefixed sibling without a stamp suffix is not a deployment
        let victims = select_victims(listing, &plan, 1);
        assert_eq!(victims, vec!["/srv/site-main-2026-08-01-00-00-00"]);
    }

    #[test]
    fn test_non_stamp_suffix_does_not_occupy_a_keep_slot() {
        let plan = plan_with_stamp("2026-08-29-12-00-00");
        // `backup` sorts after every stamp; if it were a candidate it would
        // push a real recent deployment into the surplus
        let listing = "\
/srv/site-main-2026-08-01-00-00-00
/srv/site-main-2026-08-02-00-00-00
/srv/site-main-backup
/srv/site-main-2026-08-29-12-00-00
";
        let victims = select_victims(listing, &plan, 3);
        assert_eq!(victims, vec!["/srv/site-main-2026-08-01-00-00-00"]);
    }

    #[test]
    fn test_malformed_stamp_widths_rejected() {
        let plan = plan_with_stamp("2026-08-29-12-00-00");
        // Right length but not a date, and a short-field variant chrono
        // would otherwise accept
        let listing = "\
/srv/site-main-aaaa-bb-cc-dd-ee-ff
/srv/site-main-2026-8-1-0-0-0
/srv/site-main-2026-08-01-00-00-00
";
        let victims = select_victims(listing, &plan, 1);
        assert_eq!(victims, vec!["/srv/site-main-2026-08-01-00-00-00"]);
    }

    #[test]
    fn test_current_missing_from_listing_still_reserved() {
        let plan = plan_with_stamp("2026-08-29-12-00-00");
        let listing = "\
/srv/site-main-2026-08-01-00-00-00
/srv/site-main-2026-08-02-00-00-00
";
        // keep_total 2 = current (unseen) + 1 old
        let victims = select_victims(listing, &plan, 2);
        assert_eq!(victims, vec!["/srv/site-main-2026-08-01-00-00-00"]);
    }
}
