#![no_main]

// Harness: arbitrary membership edges plus an arbitrary group name. Whatever the
// input, an anonymous subject must evaluate to false and an authenticated one
// must agree with the store.

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use grit_roles::{
    filters::{Bindings, FilterExpr, FilterLibrary, HAS_GROUP},
    types::UserId,
    InMemoryMembershipStore, MembershipEdge, MembershipStore, UserIdentity,
};

#[derive(Arbitrary, Debug)]
struct Input {
    groups: Vec<String>,
    group_name: String,
}

fuzz_target!(|input: Input| {
    let user = UserIdentity::authenticated(UserId::new_v4(), "fuzz");
    let anon = UserIdentity::anonymous();
    let store = InMemoryMembershipStore::from_edges(
        input
            .groups
            .iter()
            .flat_map(|g| [user.id, anon.id].map(|id| MembershipEdge { user: id, group: g.clone() })),
    );

    let mut bindings = Bindings::new();
    bindings.insert("user".to_string(), user.clone());
    bindings.insert("guest".to_string(), anon);

    let library = FilterLibrary::roles();
    let expr = |subject: &str| FilterExpr {
        subject: subject.to_string(),
        filter: HAS_GROUP.to_string(),
        argument: input.group_name.clone(),
    };

    assert_eq!(expr("guest").evaluate(&library, &store, &bindings), Ok(false));
    let expected = !input.group_name.is_empty() && store.is_member(&user.id, &input.group_name).unwrap_or(false);
    assert_eq!(expr("user").evaluate(&library, &store, &bindings), Ok(expected));
});
