use flowcanvas::vars::VariableStore;

#[test]
fn set_get_remove_clear() {
    let mut vars = VariableStore::new();
    vars.set("tone", "friendly");
    assert_eq!(vars.get("tone"), Some("friendly"));

    vars.set("tone", "formal");
    assert_eq!(vars.get("tone"), Some("formal"));

    vars.remove("tone");
    assert_eq!(vars.get("tone"), None);
    // Removing an absent name is a no-op.
    vars.remove("tone");

    vars.set("a", "1");
    vars.set("b", "2");
    vars.clear();
    assert!(vars.is_empty());
}

#[test]
fn absent_is_distinguishable_from_empty() {
    let mut vars = VariableStore::new();
    vars.set("blank", "");
    assert_eq!(vars.get("blank"), Some(""));
    assert_eq!(vars.get("missing"), None);
}

#[test]
fn interpolate_replaces_known_tokens() {
    let mut vars = VariableStore::new();
    vars.set("name", "Ada");
    vars.set("topic", "graphs");
    assert_eq!(
        vars.interpolate("Hi {{name}}, tell me about {{topic}}."),
        "Hi Ada, tell me about graphs."
    );
}

#[test]
fn unresolved_tokens_stay_verbatim() {
    let vars = VariableStore::new();
    assert_eq!(vars.interpolate("keep {{unknown}} here"), "keep {{unknown}} here");
}

#[test]
fn interpolate_accepts_full_identifier_charset() {
    let mut vars = VariableStore::new();
    vars.set("_x1", "a");
    vars.set("$y", "b");
    assert_eq!(vars.interpolate("{{_x1}}{{$y}}"), "ab");
    // Leading digits are not identifiers.
    assert_eq!(vars.interpolate("{{9lives}}"), "{{9lives}}");
}

#[test]
fn interpolate_does_not_mutate_the_store() {
    let mut vars = VariableStore::new();
    vars.set("x", "1");
    let before = vars.len();
    let _ = vars.interpolate("{{x}} {{y}}");
    assert_eq!(vars.len(), before);
    assert_eq!(vars.get("y"), None);
}

#[test]
fn interpolation_is_idempotent_for_token_free_values() {
    let mut vars = VariableStore::new();
    vars.set("who", "world");
    let once = vars.interpolate("hello {{who}} {{missing}}");
    // Holds only while no variable value contains {{...}} tokens itself;
    // unresolved tokens re-resolve to themselves.
    let mut shadow = VariableStore::new();
    shadow.set("who", "world");
    assert_eq!(shadow.interpolate(&once), once);
}

#[test]
fn empty_value_interpolates_to_nothing() {
    let mut vars = VariableStore::new();
    vars.set("gone", "");
    assert_eq!(vars.interpolate("[{{gone}}]"), "[]");
}
