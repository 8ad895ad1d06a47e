#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::descriptor::{CorsPolicy, Origin};
use serde_json::{json, Map};

#[test]
fn test_relative_require_from_nested_handler() {
    assert_eq!(
        relative_require("functions/user/find.js", "api/controllers/user/find.js"),
        "../../api/controllers/user/find.js"
    );
    assert_eq!(
        relative_require("functions/status.js", "initialize-orm.js"),
        "../initialize-orm.js"
    );
}

#[test]
fn test_relative_require_shares_prefix() {
    assert_eq!(
        relative_require("functions/authorizers/jwt.js", "functions/authorizers/jwt-impl.js"),
        "./jwt-impl.js"
    );
    assert_eq!(
        relative_require("jobs/a/b.js", "jobs/c.js"),
        "../c.js"
    );
}

#[test]
fn test_plan_bootstrap_order() {
    let plan = HandlerPlan::new(
        "functions/user/find.js",
        "api/controllers/user/find.js",
        HandlerSupport {
            helpers: true,
            orm: true,
        },
        CorsLiteral::Off,
    );
    assert_eq!(
        plan.bootstrap,
        vec![
            BootstrapStep::Helpers("../../initialize-helpers.js".to_string()),
            BootstrapStep::Orm("../../initialize-orm.js".to_string()),
        ]
    );
    assert_eq!(plan.teardown, vec![TeardownStep::Orm]);
}

#[test]
fn test_plan_without_support_has_no_steps() {
    let plan = HandlerPlan::new(
        "functions/status.js",
        "api/controllers/status.js",
        HandlerSupport::default(),
        CorsLiteral::Off,
    );
    assert!(plan.bootstrap.is_empty());
    assert!(plan.teardown.is_empty());
    assert_eq!(plan.target, "../api/controllers/status.js");
}

#[test]
fn test_render_handler_with_policy() {
    let policy = CorsPolicy {
        origin: Origin::default(),
        headers: vec!["content-type".to_string()],
        allow_credentials: false,
    };
    let source = HandlerPlan::new(
        "functions/user/find.js",
        "api/controllers/user/find.js",
        HandlerSupport {
            helpers: false,
            orm: true,
        },
        CorsLiteral::Policy(policy),
    )
    .render()
    .unwrap();

    assert!(source.starts_with("require('babel-polyfill');\n"), "{source}");
    assert!(source.contains("require('baggywrinkle')(require('../../api/controllers/user/find.js')"));
    assert!(source.contains("bootstrap: [require('../../initialize-orm.js')]"));
    assert!(source.contains("teardown: [(cb) => { sails.hooks.orm.teardown(cb); }]"));
    assert!(source.contains(
        r#"cors: {"origin":"*","headers":["content-type"],"allowCredentials":false}"#
    ));
    assert!(source.trim_end().ends_with("});"));
}

#[test]
fn test_render_handler_options() {
    let source = HandlerPlan::new(
        "functions/job.js",
        "jobs/cleanup/job.js",
        HandlerSupport::default(),
        CorsLiteral::Empty,
    )
    .with_option(HandlerOption::EventType("generic".to_string()))
    .render()
    .unwrap();
    assert!(source.contains("bootstrap: [], teardown: [], cors: {}, eventType: 'generic'});"));

    let source = HandlerPlan::new(
        "functions/authorizers/jwt.js",
        "api/authorizers/jwt.js",
        HandlerSupport::default(),
        CorsLiteral::On,
    )
    .with_option(HandlerOption::NoEnvelope)
    .render()
    .unwrap();
    assert!(source.contains("require('../../api/authorizers/jwt.js')"));
    assert!(source.contains("cors: true, noEnvelope: true});"));
}

#[test]
fn test_render_orm_bootstrap_embeds_settings() {
    let mut models = Map::new();
    models.insert("migrate".to_string(), json!("safe"));
    let mut datastores = Map::new();
    datastores.insert("default".to_string(), json!({ "adapter": "sails-mysql" }));

    let source = render_orm_bootstrap(&models, &datastores).unwrap();
    assert!(source.contains(r#"models: {"migrate":"safe"},"#));
    assert!(source.contains(r#"datastores: {"default":{"adapter":"sails-mysql"}},"#));
    assert!(source.contains("require('sails-hook-orm')"));
}

#[test]
fn test_render_helpers_bootstrap() {
    let source = render_helpers_bootstrap().unwrap();
    assert!(source.contains("sails.helpers"));
    assert!(source.contains("module.exports = function (done)"));
}
