#![allow(dead_code)]

use wirebox_model::{
    CallableSignature, ClassIndex, ClassInfo, Definition, DefinitionTable, MethodInfo, Parameter, ServiceTable,
    Value, Visibility,
};
use wirebox_resolve::ServiceScope;

/// Reflection snapshot shared by the integration tests.
pub fn classes() -> ClassIndex {
    ClassIndex::new()
        .with_class(ClassInfo::interface("Logger"))
        .with_class(
            ClassInfo::class("FileLogger")
                .extends("Logger")
                .constructor(vec![Parameter::new("path").typed("string").default("app.log")]),
        )
        .with_class(ClassInfo::class("NullLogger").extends("Logger"))
        .with_class(ClassInfo::class("Db"))
        .with_class(ClassInfo::interface("Cache"))
        .with_class(ClassInfo::class("Repo").constructor(vec![
            Parameter::new("db").typed("Db"),
            Parameter::new("cache").typed("Cache").default(Value::Null),
        ]))
        .with_class(
            ClassInfo::class("Mailer")
                .constructor(vec![
                    Parameter::new("logger").typed("Logger"),
                    Parameter::new("retries").typed("int").default(3i64),
                ])
                .method(MethodInfo::public("Mailer", "setLogger", vec![Parameter::new("logger").typed("Logger")]))
                .method(MethodInfo::public("Mailer", "reset", vec![]).with_visibility(Visibility::Private))
                .method(
                    MethodInfo::public("Mailer", "withRetries", vec![Parameter::new("retries").typed("int")])
                        .returns("static"),
                )
                .property("debug", Visibility::Public, Some("bool"))
                .property("transport", Visibility::Private, Some("Db")),
        )
        .with_class(
            ClassInfo::class("MailerFactory")
                .method(MethodInfo::public("MailerFactory", "create", vec![]).static_().returns("Mailer"))
                .method(MethodInfo::public("MailerFactory", "broken", vec![]).static_().returns("Missing"))
                .method(
                    MethodInfo::public("MailerFactory", "secret", vec![])
                        .with_visibility(Visibility::Private)
                        .returns("Mailer"),
                ),
        )
        .with_class(
            ClassInfo::trait_("Greets").method(MethodInfo::public("Greets", "greet", vec![]).returns("Mailer")),
        )
        .with_class(ClassInfo::class("Greeter").extends("Greets"))
        .with_class(ClassInfo::class("Base").abstract_())
        .with_class(ClassInfo::class("Hidden").constructor_with(Visibility::Private, vec![]))
        .with_class(ClassInfo::class("Guarded").constructor_with(Visibility::Protected, vec![]))
        .with_class(ClassInfo::interface("Handler"))
        .with_class(ClassInfo::class("HandlerA").extends("Handler"))
        .with_class(ClassInfo::class("HandlerB").extends("Handler"))
        .with_class(
            ClassInfo::class("Dispatcher").constructor(vec![Parameter::new("handlers").of_elements("Handler")]),
        )
        .with_class(
            ClassInfo::class("Node")
                .constructor(vec![Parameter::new("parent").typed("Node").nullable()])
                .method(MethodInfo::public("Node", "setParent", vec![Parameter::new("parent").typed("Node")])),
        )
        .with_class(ClassInfo::class("App\\Mailer").method(
            MethodInfo::public("App\\Mailer", "reset", vec![]).with_visibility(Visibility::Private),
        ))
        .with_class(ClassInfo::class("Container"))
        .with_class(ClassInfo::class("Console").constructor(vec![Parameter::new("container").typed("Container")]))
        .with_class(ClassInfo::class("stdClass"))
        .with_function(CallableSignature::function("createLogger", vec![]).returns("Logger"))
        .with_function(CallableSignature::function("make", vec![Parameter::new("what")]))
}

/// A table with the given `(name, type)` services.
pub fn table_of(services: &[(&str, &str)]) -> ServiceTable {
    let mut table = ServiceTable::new();
    for (name, ty) in services {
        table.add(Definition::of_type(*ty).named(*name)).unwrap();
    }
    table
}

/// The scope a factory of the named service is completed in.
pub fn scope_of(table: &ServiceTable, name: &str) -> ServiceScope {
    let id = table.get_definition(name).unwrap();
    ServiceScope {
        service: Some(id),
        name: Some(name.to_string()),
        ty: table.definition(id).ty().map(str::to_string),
        self_allowed: false,
    }
}
