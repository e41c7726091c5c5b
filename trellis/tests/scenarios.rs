//! End-to-end request scenarios through a fully assembled application.

mod common;

use common::{ErrorSpy, attribute_responder};
use trellis::prelude::*;
use trellis::testing::{AttributeEchoMiddleware, MapController, TemplateRenderer};

#[tokio::test]
async fn controller_output_is_rendered() {
    let mut router = PathRouter::new();
    router
        .add("greet", "/greet", RouteSpec::new().controller("greet"))
        .unwrap();
    let mut services = ServiceRegistry::new();
    services.register_controller("greet", MapController::single("content", "hi"));

    let app = Application::builder()
        .matcher(router)
        .container(services)
        .renderer(TemplateRenderer)
        .build();

    let response = app.run(Request::get("/greet")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.body().contains("hi"));
}

#[tokio::test]
async fn unmatched_request_is_a_404() {
    let mut router = PathRouter::new();
    router
        .add("greet", "/greet", RouteSpec::new().controller("greet"))
        .unwrap();

    let app = Application::builder()
        .matcher(router)
        .container(ServiceRegistry::new())
        .renderer(TemplateRenderer)
        .build();

    let response = app.run(Request::get("/elsewhere")).await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.body(), "Page not found.");
}

#[tokio::test]
async fn unregistered_controller_reports_not_found() {
    let mut router = PathRouter::new();
    router
        .add("ghost", "/ghost", RouteSpec::new().controller("ghost"))
        .unwrap();

    let spy = ErrorSpy::new();
    let app = Application::builder()
        .matcher(router)
        .container(ServiceRegistry::new())
        .renderer(TemplateRenderer)
        .attach(Topic::DispatchError, 10, spy.clone())
        .build();

    let response = app.run(Request::get("/ghost")).await.unwrap();
    assert_eq!(response.status(), 404);

    let sighting = spy.last().expect("error channel should have fired");
    assert_eq!(sighting.kind, ErrorKind::ControllerNotFound);
    assert_eq!(sighting.controller.as_deref(), Some("ghost"));
}

#[tokio::test]
async fn middleware_pipe_passes_state_downstream() {
    let mut router = PathRouter::new();
    router
        .add(
            "piped",
            "/piped",
            RouteSpec::new().middleware(["tag", "respond"]),
        )
        .unwrap();
    let mut services = ServiceRegistry::new();
    services.register_middleware("tag", AttributeEchoMiddleware::set("who", "pipe"));
    services.register_middleware("respond", attribute_responder("who"));

    let app = Application::builder()
        .matcher(router)
        .container(services)
        .renderer(TemplateRenderer)
        .build();

    let response = app.run(Request::get("/piped")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), "pipe");
}

#[tokio::test]
async fn empty_middleware_pipe_surfaces_as_exception() {
    let mut router = PathRouter::new();
    router
        .add(
            "hollow",
            "/hollow",
            RouteSpec::new().middleware(Vec::<&str>::new()),
        )
        .unwrap();

    let spy = ErrorSpy::new();
    let app = Application::builder()
        .matcher(router)
        .container(ServiceRegistry::new())
        .renderer(TemplateRenderer)
        .attach(Topic::DispatchError, 10, spy.clone())
        .build();

    let response = app.run(Request::get("/hollow")).await.unwrap();
    assert_eq!(response.status(), 500);

    let sighting = spy.last().expect("error channel should have fired");
    assert_eq!(sighting.kind, ErrorKind::Exception);
    assert!(sighting.pipe_exhausted);
}

#[tokio::test]
async fn display_exceptions_exposes_the_failure() {
    let mut router = PathRouter::new();
    router
        .add("bad", "/bad", RouteSpec::new().controller("bad"))
        .unwrap();
    let mut services = ServiceRegistry::new();
    services.register_controller("bad", trellis::testing::FailingController::new("boom"));

    let app = Application::builder()
        .matcher(router)
        .container(services)
        .renderer(TemplateRenderer)
        .display_exceptions()
        .build();

    let response = app.run(Request::get("/bad")).await.unwrap();
    assert_eq!(response.status(), 500);
    assert!(response.body().contains("boom"));
}
