//! Version comparison against fix boundaries
//!
//! A target version is vulnerable when it sits on the same major line as a
//! fix version and predates it. Versions are compared component by
//! component after splitting on `.`; segments that are not plain numbers are
//! read leniently (leading digits, else zero) so that malformed knowledge-base
//! data never aborts a scan.

use tracing::debug;

/// Compares an observed version against the versions that fix a weakness
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionComparator;

impl VersionComparator {
    /// Decide whether `target` predates any of the `fixes` on its own major line.
    ///
    /// Returns `false` when `target` is absent or blank, or `fixes` is empty. The verdict
    /// is the logical OR of every candidate: a later candidate never clears a
    /// vulnerability established by an earlier one.
    pub fn is_vulnerable<S: AsRef<str>>(target: Option<&str>, fixes: &[S]) -> bool {
        let target = match target {
            Some(t) if !t.trim().is_empty() && !fixes.is_empty() => t,
            _ => return false,
        };

        let target_parts = parse_components(target);

        let mut vulnerable = false;
        for fix in fixes {
            let fix_parts = parse_components(fix.as_ref());
            let verdict = compare_with_fix(&target_parts, &fix_parts);
            debug!(
                target = target,
                fix = fix.as_ref(),
                ?target_parts,
                ?fix_parts,
                verdict,
                "compared version against fix candidate"
            );
            vulnerable |= verdict;
        }

        vulnerable
    }
}

/// Split a version string into numeric components.
///
/// `"2.3.11"` becomes `[2, 3, 11]`, `"1.0.rc2"` becomes `[1, 0, 0]` and
/// `"4.2beta"` becomes `[4, 2]`.
pub fn parse_components(version: &str) -> Vec<u64> {
    if version.is_empty() {
        return Vec::new();
    }
    version.split('.').map(leading_number).collect()
}

fn leading_number(segment: &str) -> u64 {
    let trimmed = segment.trim_start();
    let digits: &str = match trimmed.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &trimmed[..end],
        None => trimmed,
    };
    // Overflowing segments saturate rather than fail
    digits
        .parse::<u64>()
        .unwrap_or(if digits.is_empty() { 0 } else { u64::MAX })
}

/// Verdict for a single fix candidate.
fn compare_with_fix(target: &[u64], fix: &[u64]) -> bool {
    // Different major line: this fix says nothing about the target
    if target.first() != fix.first() {
        return false;
    }

    // Same major line but a minor level missing on one side: flag rather than miss
    if target.get(1).is_none() != fix.get(1).is_none() {
        return true;
    }

    let mut vulnerable = false;

    if let (Some(t_minor), Some(f_minor)) = (target.get(1), fix.get(1)) {
        if t_minor < f_minor {
            vulnerable = true;
        }
    }

    if target.get(1) == fix.get(1) {
        let t_patch = target.get(2);
        let f_patch = fix.get(2);

        if let (Some(t), Some(f)) = (t_patch, f_patch) {
            if t < f {
                vulnerable = true;
            }
        }

        vulnerable = match (t_patch, f_patch) {
            (Some(t), Some(f)) if target.len() == 4 && fix.len() == 4 && t == f => {
                target[3] < fix[3]
            }
            (Some(t), Some(f)) if t >= f => false,
            (Some(_), Some(_)) => true,
            // Patch level missing on one side: flag rather than miss
            _ => true,
        };
    }

    vulnerable
}
