//! Option resolution behaviour through the public API.

use procopts::{AddOutcome, DomainError, MandatoryOption, OptionKey, OptionSet};

#[test]
fn test_mandatory_options_are_returned_in_declared_order() {
    let mandatory = ["-XX:+AlwaysPreTouch", "-server", "-Xss1m", "-Djava.awt.headless=true"];
    let set = OptionSet::new(mandatory).expect("unique keys");
    assert_eq!(set.get_all(), mandatory);
}

#[test]
fn test_duplicate_mandatory_key_is_configuration_error() {
    for mandatory in [
        vec!["-Xss1m", "-Xss2m"],
        vec!["-XX:+AlwaysPreTouch", "-server", "-XX:-AlwaysPreTouch"],
        vec!["-Dfile.encoding=UTF-8", "-Dfile.encoding"],
    ] {
        let err = OptionSet::new(mandatory.clone()).unwrap_err();
        assert!(
            matches!(err, DomainError::Configuration(_)),
            "{mandatory:?} should be rejected, got {err:?}"
        );
    }
}

#[test]
fn test_encoding_override_example() {
    let mut set = OptionSet::new(["-Xss1m", "-Dfile.encoding=UTF-8"]).unwrap();
    set.add("-Dfile.encoding=ISO-8859-1").unwrap();
    assert_eq!(set.get_all(), ["-Xss1m", "-Dfile.encoding=ISO-8859-1"]);
}

#[test]
fn test_mixed_sequence_of_adds() {
    let mut set = OptionSet::new([
        MandatoryOption::overridable("-XX:+UseConcMarkSweepGC"),
        MandatoryOption::overridable("-Xss1m"),
        MandatoryOption::locked("-Djna.nosys=true"),
    ])
    .unwrap();

    assert_eq!(set.add("-Xmx512m").unwrap(), AddOutcome::Appended);
    assert_eq!(set.add("-Dsearch.port=9001").unwrap(), AddOutcome::Appended);
    assert!(matches!(set.add("-Xss4m").unwrap(), AddOutcome::OverrodeMandatory { .. }));
    assert!(matches!(set.add("-Xmx1g").unwrap(), AddOutcome::Replaced { .. }));
    assert!(matches!(set.add("-XX:-UseConcMarkSweepGC").unwrap(), AddOutcome::OverrodeMandatory { .. }));
    assert!(matches!(set.add("-Djna.nosys=false"), Err(DomainError::InvalidOption { .. })));
    assert!(matches!(set.add(""), Err(DomainError::InvalidOption { .. })));

    assert_eq!(
        set.get_all(),
        [
            "-XX:-UseConcMarkSweepGC",
            "-Xss4m",
            "-Djna.nosys=true",
            "-Xmx1g",
            "-Dsearch.port=9001",
        ]
    );
    assert!(set.is_mandatory(&OptionKey::flag("-XX:UseConcMarkSweepGC")));
    assert!(!set.is_mandatory(&OptionKey::flag("-Xmx")));
}

#[test]
fn test_remove_unknown_key_is_noop() {
    let mut set = OptionSet::new(["-server"]).unwrap();
    assert!(set.remove(&OptionKey::property("missing")).unwrap().is_none());
    assert_eq!(set.get_all(), ["-server"]);
}
