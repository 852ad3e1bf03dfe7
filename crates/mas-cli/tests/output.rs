use std::path::Path;

use mas_cli::output::output_path;
use mas_model::AnalysisKind;
use proptest::prelude::*;

proptest! {
    #[test]
    fn outputs_stay_next_to_the_prefix(
        stem in "[a-z][a-z0-9_]{0,8}",
        tag in proptest::option::of("[A-Za-z0-9_./:]{1,10}"),
    ) {
        let prefix = Path::new("results").join(&stem);
        let path = output_path(&prefix, AnalysisKind::Phewas, tag.as_deref(), "tsv");
        prop_assert_eq!(path.parent(), Some(Path::new("results")));
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        let expected_start = format!("{stem}.phewas.");
        prop_assert!(name.starts_with(&expected_start));
        prop_assert!(name.ends_with(".tsv"));
    }
}
