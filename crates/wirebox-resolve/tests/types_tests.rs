mod common;

use expect_test::expect;
use wirebox_model::{Definition, DefinitionTable, Dependency, Entity, Reference, ServiceTable, Statement, Target};
use wirebox_resolve::{Resolver, ServiceScope};

fn static_call(class: &str, method: &str) -> Entity {
    Entity::call(Target::Class(class.to_string()), method)
}

#[test]
fn test_class_entities() {
    let classes = common::classes();
    let mut table = ServiceTable::new();
    let mut resolver = Resolver::new(&mut table, &classes);
    let scope = ServiceScope::detached();

    assert_eq!(resolver.resolve_entity_type(&Entity::class("\\Db"), &scope).unwrap().as_deref(), Some("Db"));

    let err = resolver.resolve_entity_type(&Entity::class("Logger"), &scope).unwrap_err();
    expect!["Interface Logger can not be used as 'factory', did you mean 'implement'?"].assert_eq(&err.to_string());

    let err = resolver.resolve_entity_type(&Entity::class("Nope"), &scope).unwrap_err();
    expect!["Class Nope not found."].assert_eq(&err.to_string());

    assert_eq!(resolver.resolve_entity_type(&Entity::Literal("1 + 1".into()), &scope).unwrap(), None);
}

#[test]
fn test_factory_methods() {
    let classes = common::classes();
    let mut table = ServiceTable::new();
    {
        let mut resolver = Resolver::new(&mut table, &classes);
        let scope = ServiceScope::detached();
        assert_eq!(
            resolver.resolve_entity_type(&static_call("MailerFactory", "create"), &scope).unwrap().as_deref(),
            Some("Mailer")
        );
        assert_eq!(
            resolver.resolve_entity_type(&Entity::function("createLogger"), &scope).unwrap().as_deref(),
            Some("Logger")
        );
        // No declared return type: unknown until runtime.
        assert_eq!(resolver.resolve_entity_type(&Entity::function("make"), &scope).unwrap(), None);
    }
    let dependencies: Vec<_> = table.dependencies().cloned().collect();
    assert_eq!(
        dependencies,
        vec![
            Dependency::Callable("MailerFactory::create".into()),
            Dependency::Callable("createLogger".into()),
            Dependency::Callable("make".into()),
        ]
    );
}

#[test]
fn test_static_return_type_is_the_declaring_class() {
    let classes = common::classes();
    let mut table = common::table_of(&[("mailer", "Mailer")]);
    let mut resolver = Resolver::new(&mut table, &classes);
    let entity = Entity::member_of(Reference::name("mailer"), "withRetries");
    assert_eq!(
        resolver.resolve_entity_type(&entity, &ServiceScope::detached()).unwrap().as_deref(),
        Some("Mailer")
    );
}

#[test]
fn test_uncallable_members() {
    let classes = common::classes();
    let mut table = ServiceTable::new();
    let mut resolver = Resolver::new(&mut table, &classes);
    let scope = ServiceScope::detached();

    let err = resolver.resolve_entity_type(&static_call("MailerFactory", "secret"), &scope).unwrap_err();
    expect!["Method MailerFactory::secret() is not callable."].assert_eq(&err.to_string());

    let err = resolver.resolve_entity_type(&static_call("MailerFactory", "missing"), &scope).unwrap_err();
    expect!["Method MailerFactory::missing() is not callable."].assert_eq(&err.to_string());

    // Instance methods of traits cannot be called.
    let err = resolver.resolve_entity_type(&static_call("Greeter", "greet"), &scope).unwrap_err();
    expect!["Method Greeter::greet() is not callable."].assert_eq(&err.to_string());

    let err = resolver.resolve_entity_type(&Entity::function("nope"), &scope).unwrap_err();
    expect!["Function nope() doesn't exist."].assert_eq(&err.to_string());
}

#[test]
fn test_declared_return_type_must_exist() {
    let classes = common::classes();
    let mut table = ServiceTable::new();
    let mut resolver = Resolver::new(&mut table, &classes);
    let err = resolver
        .resolve_entity_type(&static_call("MailerFactory", "broken"), &ServiceScope::detached())
        .unwrap_err();
    expect!["Class or interface 'Missing' not found. Is return type of MailerFactory::broken() correct?"]
        .assert_eq(&err.to_string());
}

#[test]
fn test_reference_types() {
    let classes = common::classes();
    let mut table = common::table_of(&[("db", "Db")]);
    let factory = table
        .add(Definition::service(static_call("MailerFactory", "create")).named("mailer"))
        .unwrap();
    let scope = common::scope_of(&table, "db");
    let mut resolver = Resolver::new(&mut table, &classes);

    assert_eq!(resolver.resolve_reference_type(&Reference::This, &scope).unwrap().as_deref(), Some("Db"));
    assert_eq!(
        resolver.resolve_reference_type(&Reference::of_type("\\App\\Mailer"), &scope).unwrap().as_deref(),
        Some("App\\Mailer")
    );
    // Untyped targets are resolved on demand.
    assert_eq!(
        resolver.resolve_reference_type(&Reference::name("mailer"), &scope).unwrap().as_deref(),
        Some("Mailer")
    );
    assert_eq!(resolver.table().definition(factory).ty(), Some("Mailer"));
    assert_eq!(resolver.resolve_reference(&Reference::This, &scope).unwrap(), scope.service.unwrap());
}

#[test]
fn test_call_on_nested_statement() {
    let classes = common::classes();
    let mut table = ServiceTable::new();
    let mut resolver = Resolver::new(&mut table, &classes);
    let inner = Statement::new(static_call("MailerFactory", "create"));
    let entity = Entity::call(Target::Statement(inner), "withRetries");
    assert_eq!(
        resolver.resolve_entity_type(&entity, &ServiceScope::detached()).unwrap().as_deref(),
        Some("Mailer")
    );

    let unknown = Entity::call(Target::Statement(Statement::new(Entity::function("make"))), "anything");
    assert_eq!(resolver.resolve_entity_type(&unknown, &ServiceScope::detached()).unwrap(), None);
}
