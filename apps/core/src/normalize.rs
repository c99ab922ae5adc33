use crate::dispatcher::{route, Ranking};
use crate::model::{has_application_suffix, Domain, RawResult, ResultSet, SearchResult};

pub fn classify(domain: Domain, raw: RawResult) -> SearchResult {
    let is_application = domain == Domain::Applications || has_application_suffix(&raw.name);
    SearchResult {
        name: raw.name,
        path: raw.path,
        is_application,
        icon: raw.icon,
    }
}

/// Two-way stable partition: applications first, each group keeps its
/// backend order. Not a comparator sort.
pub fn partition_applications_first(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let (mut applications, others): (Vec<_>, Vec<_>) =
        results.into_iter().partition(|result| result.is_application);
    applications.extend(others);
    applications
}

pub fn rank(ranking: Ranking, results: Vec<SearchResult>) -> Vec<SearchResult> {
    match ranking {
        Ranking::Verbatim => results,
        Ranking::ApplicationsFirst => partition_applications_first(results),
    }
}

pub fn normalize(domain: Domain, raw: Vec<RawResult>) -> Vec<SearchResult> {
    let classified = raw.into_iter().map(|item| classify(domain, item)).collect();
    rank(route(domain).ranking, classified)
}

pub fn build_result_set(domain: Domain, seq: u64, query: &str, raw: Vec<RawResult>) -> ResultSet {
    ResultSet::new(domain, seq, query, normalize(domain, raw))
}

#[cfg(test)]
mod tests {
    use super::{build_result_set, classify, normalize};
    use crate::model::{Domain, RawResult};
    use rstest::rstest;

    fn names(domain: Domain, raw: &[&str]) -> Vec<String> {
        let raw = raw
            .iter()
            .map(|name| RawResult::new(*name, format!("/tmp/{name}")))
            .collect();
        normalize(domain, raw).into_iter().map(|r| r.name).collect()
    }

    #[rstest]
    #[case("Safari.app", true)]
    #[case("SETUP.EXE", true)]
    #[case("installer.dmg", true)]
    #[case("Tool.pkg", true)]
    #[case("notes.txt", false)]
    #[case("app", false)]
    #[case("report.apple", false)]
    fn files_domain_classifies_by_suffix(#[case] name: &str, #[case] expected: bool) {
        let result = classify(Domain::Files, RawResult::new(name, "/x"));
        assert_eq!(result.is_application, expected);
    }

    #[test]
    fn applications_domain_marks_everything_as_application() {
        let result = classify(Domain::Applications, RawResult::new("Terminal", "/bin/term"));
        assert!(result.is_application);
    }

    #[test]
    fn files_domain_moves_applications_ahead_stably() {
        assert_eq!(
            names(Domain::Files, &["a.txt", "b.app", "c.txt"]),
            vec!["b.app", "a.txt", "c.txt"]
        );
        assert_eq!(
            names(Domain::Files, &["z.txt", "y.exe", "x.txt", "w.app", "v.md"]),
            vec!["y.exe", "w.app", "z.txt", "x.txt", "v.md"]
        );
    }

    #[test]
    fn applications_domain_keeps_backend_order() {
        assert_eq!(
            names(Domain::Applications, &["Zed.app", "Arc.app", "Mail.app"]),
            vec!["Zed.app", "Arc.app", "Mail.app"]
        );
    }

    #[test]
    fn result_set_is_tagged_with_domain_and_sequence() {
        let set = build_result_set(
            Domain::Files,
            7,
            "doc",
            vec![RawResult::new("doc.txt", "/doc.txt").with_score(1.5)],
        );
        assert_eq!(set.domain, Domain::Files);
        assert_eq!(set.seq, 7);
        assert_eq!(set.query, "doc");
        assert_eq!(set.len(), 1);
    }
}
