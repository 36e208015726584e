use crate::Role;

#[test]
fn given_known_names_when_parse_then_maps_to_variants() {
    assert_eq!(Role::parse("user"), Role::User);
    assert_eq!(Role::parse("analyst"), Role::Analyst);
    assert_eq!(Role::parse("admin"), Role::Admin);
}

#[test]
fn given_any_role_name_when_is_admin_then_true_only_for_exact_admin() {
    let names = [
        "admin",
        "Admin",
        "ADMIN",
        "administrator",
        " admin",
        "admin ",
        "user",
        "analyst",
        "",
        "superuser",
    ];

    for name in names {
        assert_eq!(
            Role::parse(name).is_admin(),
            name == "admin",
            "is_admin mismatch for {name:?}"
        );
    }
}

#[test]
fn given_unknown_name_when_parse_then_kept_verbatim() {
    let role = Role::parse("Admin");

    assert_eq!(role, Role::Other("Admin".into()));
    assert_eq!(role.as_str(), "Admin");
}

#[test]
fn given_role_when_serialize_then_plain_string() {
    assert_eq!(serde_json::to_string(&Role::Analyst).unwrap(), r#""analyst""#);
    assert_eq!(
        serde_json::to_string(&Role::Other("auditor".into())).unwrap(),
        r#""auditor""#
    );
}

#[test]
fn given_json_string_when_deserialize_then_parses_role() {
    let role: Role = serde_json::from_str(r#""admin""#).unwrap();
    assert!(role.is_admin());
}
