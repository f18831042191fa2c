use consume::app::App;
use consume::router::match_path;
use consume::server::InboundRequest;
use consume::validator::{number, string, validate, ValidatorOptions};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use http::Method;
use serde_json::json;

fn zoo_app() -> App {
    let mut app = App::new();
    app.get("/", |_req, res| res.ok(json!({})))
        .get("/zoo/animals", |_req, res| res.ok(json!([])))
        .post_validated(
            "/zoo/animals/add",
            validate(
                [("name", string().required()), ("age", number().optional())],
                ValidatorOptions::default(),
            ),
            |_req, res| res.ok(json!({"added": true})),
        )
        .get("/zoo/animals/:id", |req, res| {
            res.ok(json!({"id": req.path_param("id")}))
        })
        .get("/zoo/animals/:id/toys/:toy_id", |_req, res| res.ok(json!({})))
        .get(
            "/zoo/:category/animals/:id/habitats/:habitat_id/sections/:section_id",
            |_req, res| res.ok(json!({})),
        )
        .get("/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i", |_req, res| {
            res.ok(json!({}))
        });
    app
}

fn bench_match_path(c: &mut Criterion) {
    c.bench_function("match_path_capture", |b| {
        b.iter(|| match_path(black_box("/zoo/animals/123/toys/9"), black_box("/zoo/animals/:id/toys/:toy_id")))
    });
    c.bench_function("match_path_segment_count_miss", |b| {
        b.iter(|| match_path(black_box("/zoo/animals/123"), black_box("/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i")))
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = match zoo_app().build() {
        Ok(d) => d,
        Err(e) => panic!("bench app failed to build: {e}"),
    };
    let paths = [
        "/",
        "/zoo/animals",
        "/zoo/animals/42",
        "/zoo/animals/42/toys/7",
        "/zoo/reptiles/animals/1/habitats/2/sections/3",
        "/complex/1/2/3/4/5/6/7/8/9",
        "/not/registered",
    ];

    c.bench_function("dispatch_get_mix", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(dispatcher.dispatch(InboundRequest::new(Method::GET, *path)));
            }
        })
    });

    let body = json!({"name": "Rex", "age": 3});
    c.bench_function("dispatch_validated_post", |b| {
        b.iter(|| {
            black_box(
                dispatcher.dispatch(InboundRequest::new(Method::POST, "/zoo/animals/add").json(&body)),
            )
        })
    });
}

criterion_group!(benches, bench_match_path, bench_dispatch);
criterion_main!(benches);
