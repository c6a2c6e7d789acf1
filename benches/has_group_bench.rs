use criterion::{criterion_group, criterion_main, Criterion};
use grit_roles::filters::{Bindings, FilterExpr, FilterLibrary};
use grit_roles::types::UserId;
use grit_roles::{has_group, InMemoryMembershipStore, MembershipEdge, UserIdentity};

fn membership_benchmarks(c: &mut Criterion) {
    let alice = UserIdentity::authenticated(UserId::new_v4(), "alice");
    let edges = (0..64).map(|i| MembershipEdge { user: alice.id, group: format!("group-{i}") });
    let store = InMemoryMembershipStore::from_edges(edges);
    let anon = UserIdentity::anonymous();

    c.bench_function("has_group_hit", |b| {
        b.iter(|| has_group(&store, &alice, "group-42"))
    });

    c.bench_function("has_group_miss", |b| {
        b.iter(|| has_group(&store, &alice, "admins"))
    });

    c.bench_function("has_group_anonymous", |b| {
        b.iter(|| has_group(&store, &anon, "group-42"))
    });

    let library = FilterLibrary::roles();
    let mut bindings = Bindings::new();
    bindings.insert("user".to_string(), alice.clone());
    c.bench_function("filter_parse_and_evaluate", |b| {
        b.iter(|| {
            FilterExpr::parse(r#"user|has_group:"group-42""#)
                .and_then(|expr| expr.evaluate(&library, &store, &bindings))
        })
    });
}

criterion_group!(benches, membership_benchmarks);
criterion_main!(benches);
