//! Stage-ordering and termination guarantees of the pipeline.

mod common;

use common::FailingListener;
use trellis::prelude::*;
use trellis::testing::{
    EchoController, FailingController, FailingRenderer, MapController, RecordingListener,
    StaticMatcher, TemplateRenderer,
};

fn single_route_app(
    controller: impl Dispatchable + 'static,
) -> (Application, RecordingListener, RecordingListener) {
    let mut router = PathRouter::new();
    router
        .add("hi", "/hi", RouteSpec::new().controller("hi"))
        .unwrap();
    let mut services = ServiceRegistry::new();
    services.register_controller("hi", controller);

    let render = RecordingListener::new();
    let finish = RecordingListener::new();
    let app = Application::builder()
        .matcher(router)
        .container(services)
        .renderer(TemplateRenderer)
        .attach(Topic::Render, 10, render.clone())
        .attach(Topic::Finish, 10, finish.clone())
        .build();
    (app, render, finish)
}

#[tokio::test]
async fn finish_fires_once_on_success() {
    let (app, render, finish) = single_route_app(EchoController::new("hello"));

    let response = app.run(Request::get("/hi")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), "hello");
    // A controller that answered with a full response skips rendering.
    assert_eq!(render.count(), 0);
    assert_eq!(finish.count(), 1);
}

#[tokio::test]
async fn routing_failure_renders_then_finishes() {
    let render = RecordingListener::new();
    let finish = RecordingListener::new();
    let app = Application::builder()
        .matcher(StaticMatcher::never())
        .renderer(TemplateRenderer)
        .attach(Topic::Render, 10, render.clone())
        .attach(Topic::Finish, 10, finish.clone())
        .build();

    let response = app.run(Request::get("/missing")).await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.body(), "Page not found.");
    // Routing failure skips dispatch but still renders.
    assert_eq!(render.count(), 1);
    assert_eq!(finish.count(), 1);
}

#[tokio::test]
async fn dispatch_failure_goes_straight_to_finish() {
    let (app, render, finish) = single_route_app(FailingController::new("boom"));

    let response = app.run(Request::get("/hi")).await.unwrap();
    // The stock error responder substitutes a full response, which
    // short-circuits rendering.
    assert_eq!(response.status(), 500);
    assert_eq!(response.body(), "An error occurred.");
    assert_eq!(render.count(), 0);
    assert_eq!(finish.count(), 1);
}

#[tokio::test]
async fn render_failure_reaches_the_render_error_channel() {
    let mut router = PathRouter::new();
    router
        .add("hi", "/hi", RouteSpec::new().controller("hi"))
        .unwrap();
    let mut services = ServiceRegistry::new();
    services.register_controller("hi", MapController::single("content", "hi"));

    let finish = RecordingListener::new();
    let app = Application::builder()
        .matcher(router)
        .container(services)
        .renderer(FailingRenderer::new("template missing"))
        .attach(Topic::Finish, 10, finish.clone())
        .build();

    let response = app.run(Request::get("/hi")).await.unwrap();
    assert_eq!(response.status(), 500);
    assert_eq!(finish.count(), 1);
}

#[tokio::test]
async fn render_error_listener_failure_is_fatal_but_finishes() {
    let mut router = PathRouter::new();
    router
        .add("hi", "/hi", RouteSpec::new().controller("hi"))
        .unwrap();
    let mut services = ServiceRegistry::new();
    services.register_controller("hi", MapController::single("content", "hi"));

    let finish = RecordingListener::new();
    let app = Application::builder()
        .matcher(router)
        .container(services)
        .renderer(FailingRenderer::new("template missing"))
        .attach(Topic::RenderError, 10, FailingListener("responder down"))
        .attach(Topic::Finish, 10, finish.clone())
        .build();

    let outcome = app.run(Request::get("/hi")).await;
    assert!(outcome.is_err());
    assert_eq!(finish.count(), 1);
}

#[tokio::test]
async fn route_stage_response_short_circuits_everything_after() {
    let responder = RecordingListener::new()
        .with_output(StageOutput::Response(Response::new().with_status(201)));
    let late_route = RecordingListener::new();
    let dispatch = RecordingListener::new();
    let render = RecordingListener::new();
    let finish = RecordingListener::new();

    let app = ApplicationBuilder::bare()
        .attach(Topic::Route, 10, responder)
        .attach(Topic::Route, 5, late_route.clone())
        .attach(Topic::Dispatch, 1, dispatch.clone())
        .attach(Topic::Render, 1, render.clone())
        .attach(Topic::Finish, 1, finish.clone())
        .build();

    let response = app.run(Request::get("/")).await.unwrap();
    assert_eq!(response.status(), 201);
    assert_eq!(late_route.count(), 0);
    assert_eq!(dispatch.count(), 0);
    assert_eq!(render.count(), 0);
    assert_eq!(finish.count(), 1);
}

#[tokio::test]
async fn propagation_stop_does_not_leak_into_the_next_stage() {
    let stopper = RecordingListener::new().stopping();
    let late_route = RecordingListener::new();
    let dispatch = RecordingListener::new();

    let app = ApplicationBuilder::bare()
        .attach(Topic::Route, 10, stopper)
        .attach(Topic::Route, 5, late_route.clone())
        .attach(Topic::Dispatch, 1, dispatch.clone())
        .build();

    app.run(Request::get("/")).await.unwrap();
    assert_eq!(late_route.count(), 0);
    // The dispatch stage starts with a cleared flag.
    assert_eq!(dispatch.entry_flags(), vec![false]);
}

#[tokio::test]
async fn cancellation_skips_remaining_stages_but_finishes() {
    let route = RecordingListener::new();
    let dispatch = RecordingListener::new();
    let finish = RecordingListener::new();

    let app = ApplicationBuilder::bare()
        .attach(Topic::Route, 1, route.clone())
        .attach(Topic::Dispatch, 1, dispatch.clone())
        .attach(Topic::Finish, 1, finish.clone())
        .build();

    let token = CancelToken::new();
    token.cancel();

    let response = app.run_with(Request::get("/"), token).await.unwrap();
    assert_eq!(response.status(), 200);
    // Cancellation is observed at the stage boundary after routing.
    assert_eq!(route.count(), 1);
    assert_eq!(dispatch.count(), 0);
    assert_eq!(finish.count(), 1);
}

#[tokio::test]
async fn bootstrap_fires_once_across_runs() {
    let bootstrap = RecordingListener::new();
    let finish = RecordingListener::new();

    let app = ApplicationBuilder::bare()
        .attach(Topic::Bootstrap, 1, bootstrap.clone())
        .attach(Topic::Finish, 1, finish.clone())
        .build();

    app.run(Request::get("/a")).await.unwrap();
    app.run(Request::get("/b")).await.unwrap();

    assert_eq!(bootstrap.count(), 1);
    assert_eq!(finish.count(), 2);
}
