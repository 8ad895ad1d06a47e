#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::fs;

use common::{AppFixture, MarkingTranspiler, ScriptedRunner};
use lambdaforge::config::{load_app_config, AppConfig};
use lambdaforge::pipeline::{DeployOptions, DeployTarget, OutputLayout, Pipeline};
use lambdaforge::DeployError;
use serde_json::{json, Value};

fn load(fixture: &AppFixture) -> AppConfig {
    load_app_config(&fixture.root().join("config/app.yaml")).unwrap()
}

fn options(fixture: &AppFixture, target: DeployTarget) -> DeployOptions {
    DeployOptions {
        target,
        layout: OutputLayout::new(fixture.root(), None),
        skip_deps: false,
        no_deploy: false,
    }
}

fn descriptor(fixture: &AppFixture) -> serde_yaml::Value {
    serde_yaml::from_str(&fixture.read_output("serverless.yml")).unwrap()
}

fn function_names(descriptor: &serde_yaml::Value) -> Vec<String> {
    descriptor["functions"]
        .as_mapping()
        .unwrap()
        .keys()
        .map(|k| k.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_full_run_writes_deployment_tree() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();

    let report = Pipeline::new(&app, &transpiler, &runner)
        .run(&options(&fixture, DeployTarget::All))
        .unwrap();

    assert!(report.installed);
    assert!(report.deployed);
    assert_eq!(
        report.functions,
        vec!["userFind", "userCreate", "fileServe", "authorizersJwt"]
    );
    assert!(report.collisions.is_empty());
    assert_eq!(report.descriptor, fixture.output().join("serverless.yml"));

    let yml = descriptor(&fixture);
    assert_eq!(yml["service"].as_str(), Some("my-service"));
    assert_eq!(yml["provider"]["name"].as_str(), Some("aws"));
    assert_eq!(yml["provider"]["memorySize"].as_u64(), Some(256));
    assert_eq!(
        function_names(&yml),
        vec!["userFind", "userCreate", "fileServe", "authorizersJwt"]
    );
    let find = &yml["functions"]["userFind"];
    assert_eq!(find["handler"].as_str(), Some("functions/user/find.fn"));
    let http = &find["events"][0]["http"];
    assert_eq!(http["path"].as_str(), Some("/users/{id}"));
    assert_eq!(http["method"].as_str(), Some("get"));
    assert_eq!(http["authorizer"]["name"].as_str(), Some("authorizersJwt"));
    assert!(http.get("cors").is_none());

    let create_cors = &yml["functions"]["userCreate"]["events"][0]["http"]["cors"];
    assert_eq!(create_cors["origin"].as_str(), Some("*"));
    assert_eq!(create_cors["headers"][1].as_str(), Some("Authorization"));
    assert!(yml["functions"]["authorizersJwt"].get("events").is_none());

    let resources: Value = serde_json::from_str(&fixture.read_output("resources.json")).unwrap();
    let keys: Vec<&String> = resources.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["get /users/{id}", "post /users", "/files/{0+}"]);
    assert_eq!(resources["get /users/{id}"]["address"], "GET /users/:id");

    let manifest: Value = serde_json::from_str(&fixture.read_output("package.json")).unwrap();
    let deps = manifest["dependencies"].as_object().unwrap();
    assert!(deps.get("sails").is_none());
    assert!(deps.get("sails-hook-grunt").is_none());
    assert_eq!(deps["lodash"], "^4.17.0");
    assert!(deps.contains_key("baggywrinkle"));
    assert!(deps.contains_key("sails-hook-orm"));
    assert_eq!(manifest["devDependencies"], json!({}));
    assert_eq!(manifest["name"], "shop");

    let handler = fixture.read_output("functions/user/find.js");
    assert!(handler.contains("require('../../api/controllers/user/find.js')"));
    assert!(handler.contains("require('../../initialize-helpers.js')"));
    assert!(handler.contains("require('../../initialize-orm.js')"));
    let authorizer = fixture.read_output("functions/authorizers/jwt.js");
    assert!(authorizer.contains("noEnvelope: true"));

    let orm = fixture.read_output("initialize-orm.js");
    assert!(orm.contains("sails-disk"));
    assert!(orm.contains("\"migrate\":\"safe\""));
    assert!(fixture.output().join("initialize-helpers.js").is_file());

    assert!(fixture
        .read_output("api/controllers/user/find.js")
        .starts_with("// transpiled\n"));
    assert!(fixture
        .read_output("api/helpers/format-price.js")
        .starts_with("// transpiled\n"));
    assert!(fixture.read_output("config/models.js").contains("models"));
    assert_eq!(transpiler.seen.borrow().len(), 6);

    assert_eq!(runner.commands(), vec!["npm install", "serverless deploy"]);
    let calls = runner.calls.borrow();
    assert!(calls.iter().all(|(_, _, cwd)| *cwd == fixture.output()));
}

#[test]
fn test_repeated_runs_produce_identical_output() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();
    let pipeline = Pipeline::new(&app, &transpiler, &runner);
    let mut opts = options(&fixture, DeployTarget::All);
    opts.skip_deps = true;

    let files = [
        "serverless.yml",
        "resources.json",
        "package.json",
        "functions/user/find.js",
        "initialize-orm.js",
        "api/controllers/user/create.js",
    ];

    pipeline.run(&opts).unwrap();
    let first: Vec<String> = files.iter().map(|f| fixture.read_output(f)).collect();

    fixture.write("serverless/stale.txt", "left over");
    pipeline.run(&opts).unwrap();
    let second: Vec<String> = files.iter().map(|f| fixture.read_output(f)).collect();

    assert_eq!(first, second);
    assert!(!fixture.output().join("stale.txt").exists());
    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn test_controller_target_scopes_functions_and_service() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();

    let report = Pipeline::new(&app, &transpiler, &runner)
        .run(&options(&fixture, DeployTarget::Controller("user".to_string())))
        .unwrap();

    assert_eq!(
        report.functions,
        vec!["userFind", "userCreate", "authorizersJwt"]
    );
    let yml = descriptor(&fixture);
    assert_eq!(yml["service"].as_str(), Some("my-service-user"));
    assert!(!fixture.output().join("functions/file/serve.js").exists());
    assert_eq!(runner.commands(), vec!["npm install", "serverless deploy"]);
}

#[test]
fn test_function_target_deploys_one_function() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();

    let report = Pipeline::new(&app, &transpiler, &runner)
        .run(&options(&fixture, DeployTarget::Function("userFind".to_string())))
        .unwrap();

    assert_eq!(report.functions.len(), 4);
    assert_eq!(descriptor(&fixture)["service"].as_str(), Some("my-service"));
    assert_eq!(
        runner.commands(),
        vec!["npm install", "serverless deploy -f userFind"]
    );
}

#[test]
fn test_job_target_builds_scheduled_function() {
    let fixture = AppFixture::new();
    fixture.write("jobs/cleanup/job.js", "module.exports = async () => {};\n");
    fixture.write(
        "jobs/cleanup/config.yaml",
        "schedule: rate(1 hour)\nserverlessYml:\n  provider:\n    timeout: 300\n",
    );
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();

    let report = Pipeline::new(&app, &transpiler, &runner)
        .run(&options(&fixture, DeployTarget::Job("cleanup".to_string())))
        .unwrap();

    assert_eq!(report.functions, vec!["job"]);
    let yml = descriptor(&fixture);
    assert_eq!(yml["service"].as_str(), Some("my-service-job-cleanup"));
    assert_eq!(function_names(&yml), vec!["job"]);
    assert_eq!(
        yml["functions"]["job"]["events"][0]["schedule"].as_str(),
        Some("rate(1 hour)")
    );
    assert_eq!(yml["provider"]["timeout"].as_u64(), Some(300));
    assert_eq!(yml["provider"]["memorySize"].as_u64(), Some(256));

    assert!(!fixture.output().join("resources.json").exists());
    assert!(!fixture.output().join("api/controllers").exists());
    assert!(fixture
        .read_output("jobs/cleanup/job.js")
        .starts_with("// transpiled\n"));
    let handler = fixture.read_output("functions/job.js");
    assert!(handler.contains("require('../jobs/cleanup/job.js')"));
    assert!(handler.contains("eventType: 'generic'"));
}

#[test]
fn test_descriptor_files_are_templated_and_layered() {
    let fixture = AppFixture::new();
    fixture.write(
        "config/serverless.yml",
        "service: shop-{{ environment }}\nprovider:\n  stage: dev\n  memorySize: 128\n",
    );
    fixture.write(
        "config/serverless-development.yml",
        "provider:\n  stage: '{{ config.environment }}-local'\nfunctions:\n  userFind:\n    handler: elsewhere.fn\n",
    );
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();
    let mut opts = options(&fixture, DeployTarget::All);
    opts.skip_deps = true;

    Pipeline::new(&app, &transpiler, &runner).run(&opts).unwrap();

    let yml = descriptor(&fixture);
    assert_eq!(yml["service"].as_str(), Some("shop-development"));
    assert_eq!(yml["provider"]["stage"].as_str(), Some("development-local"));
    assert_eq!(yml["provider"]["memorySize"].as_u64(), Some(256));
    assert_eq!(yml["provider"]["runtime"].as_str(), Some("nodejs6.10"));
    assert_eq!(
        yml["functions"]["userFind"]["handler"].as_str(),
        Some("functions/user/find.fn")
    );
}

#[test]
fn test_install_failure_stops_before_deploy() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::failing_install();

    let err = Pipeline::new(&app, &transpiler, &runner)
        .run(&options(&fixture, DeployTarget::All))
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::Install(_))
    ));
    assert_eq!(runner.commands(), vec!["npm install"]);
    assert!(fixture.output().join("serverless.yml").is_file());
}

#[test]
fn test_deploy_failure_is_reported() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::failing_deploy();

    let err = Pipeline::new(&app, &transpiler, &runner)
        .run(&options(&fixture, DeployTarget::All))
        .unwrap_err();

    match err.downcast_ref::<DeployError>() {
        Some(DeployError::Deploy(message)) => assert!(message.contains("status 2"), "{message}"),
        other => panic!("Expected deploy error, got {other:?}"),
    }
}

#[test]
fn test_no_deploy_only_installs() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();
    let mut opts = options(&fixture, DeployTarget::All);
    opts.no_deploy = true;

    let report = Pipeline::new(&app, &transpiler, &runner).run(&opts).unwrap();

    assert!(report.installed);
    assert!(!report.deployed);
    assert_eq!(runner.commands(), vec!["npm install"]);
}

#[test]
fn test_require_prod_rejects_other_environments() {
    let fixture = AppFixture::new();
    let mut app = load(&fixture);
    app.serverless.require_prod = true;
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();

    let err = Pipeline::new(&app, &transpiler, &runner)
        .run(&options(&fixture, DeployTarget::All))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::NotInProduction)
    ));
    assert!(!fixture.output().exists());

    let app = app.with_environment("production");
    Pipeline::new(&app, &transpiler, &runner)
        .run(&options(&fixture, DeployTarget::All))
        .unwrap();
}

#[test]
fn test_non_app_root_is_rejected_before_writing() {
    let fixture = AppFixture::new();
    fixture.write("package.json", r#"{ "dependencies": { "express": "^4.0.0" } }"#);
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();

    let err = Pipeline::new(&app, &transpiler, &runner)
        .run(&options(&fixture, DeployTarget::All))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::NotInAppRoot { .. })
    ));
    assert!(!fixture.output().exists());
    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn test_plan_does_not_write() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();

    let assembly = Pipeline::new(&app, &transpiler, &runner)
        .plan(&DeployTarget::All, fixture.root())
        .unwrap();

    assert_eq!(assembly.functions.len(), 4);
    assert!(assembly.files.contains_key("functions/file/serve.js"));
    assert!(!fixture.output().exists());
    assert!(transpiler.seen.borrow().is_empty());
}

#[test]
fn test_custom_output_directory() {
    let fixture = AppFixture::new();
    let out = tempfile::tempdir().unwrap();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();
    let opts = DeployOptions {
        target: DeployTarget::All,
        layout: OutputLayout::new(fixture.root(), Some(out.path().join("build"))),
        skip_deps: true,
        no_deploy: false,
    };

    let report = Pipeline::new(&app, &transpiler, &runner).run(&opts).unwrap();

    assert_eq!(report.descriptor, out.path().join("build/serverless.yml"));
    assert!(fs::metadata(out.path().join("build/functions/user/find.js")).is_ok());
    assert!(!fixture.output().exists());
}

#[test]
fn test_output_overlapping_app_is_rejected() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();
    let pipeline = Pipeline::new(&app, &transpiler, &runner);

    for output in [
        fixture.root().to_path_buf(),
        fixture.root().parent().unwrap().to_path_buf(),
        fixture.root().join("api/controllers/build"),
    ] {
        let opts = DeployOptions {
            target: DeployTarget::All,
            layout: OutputLayout::new(fixture.root(), Some(output)),
            skip_deps: false,
            no_deploy: false,
        };
        let err = pipeline.run(&opts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::BadArgs(_))
        ));
    }

    assert!(fixture.root().join("config/app.yaml").is_file());
    assert!(fixture.root().join("api/controllers/user/find.js").is_file());
    assert!(!fixture.root().join("api/controllers/build").exists());
    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn test_missing_job_is_rejected_before_writing() {
    let fixture = AppFixture::new();
    let app = load(&fixture);
    let transpiler = MarkingTranspiler::default();
    let runner = ScriptedRunner::succeeding();
    let pipeline = Pipeline::new(&app, &transpiler, &runner);
    let target = DeployTarget::Job("nosuchjob".to_string());

    let err = pipeline.run(&options(&fixture, target.clone())).unwrap_err();
    match err.downcast_ref::<DeployError>() {
        Some(DeployError::BadArgs(message)) => assert!(message.contains("nosuchjob"), "{message}"),
        other => panic!("Expected bad args, got {other:?}"),
    }
    assert!(!fixture.output().exists());
    assert!(runner.calls.borrow().is_empty());

    assert!(pipeline.plan(&target, fixture.root()).is_err());
}
