use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::{HeaderMap, HeaderValue, StatusCode};
use sessionnet::fingerprint::Ja3Spec;
use sessionnet::http::{build_response, cookies_from_headers, HttpResponse, ResponseBody};
use sessionnet::{build_request, RequestInput};

const CHROME_JA3: &str = "771,4865-4866-4867-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-13-18-51-45-43-27-17513-21,29-23-24,0";

/// Request translation with a browser-like header set.
fn bench_build_request(c: &mut Criterion) {
    let input = RequestInput::new("POST", "https://example.com/api/v1/items?page=2")
        .with_header("host", "example.com")
        .with_header("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
        .with_header("accept", "application/json")
        .with_header("accept-language", "en-US,en;q=0.9")
        .with_header("accept-encoding", "gzip, deflate, br")
        .with_header("content-type", "application/json")
        .with_header("cookie", "a=1; b=2")
        .with_body(r#"{"name":"widget","count":3}"#);

    c.bench_function("build_request", |b| {
        b.iter(|| black_box(build_request(black_box(&input)).unwrap()))
    });
}

fn response_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("text/html"));
    for i in 0..8 {
        let cookie = format!("c{}=v{}; Path=/; HttpOnly", i, i);
        headers.append("set-cookie", HeaderValue::from_str(&cookie).unwrap());
    }
    headers
}

fn bench_build_response(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let headers = response_headers();
    let body = vec![b'x'; 16 * 1024];

    c.bench_function("cookies_from_headers", |b| {
        b.iter(|| black_box(cookies_from_headers(black_box(&headers))))
    });

    c.bench_function("build_response_16k", |b| {
        b.to_async(&rt).iter(|| async {
            let response = HttpResponse::new(
                StatusCode::OK,
                headers.clone(),
                ResponseBody::from_bytes(body.clone()),
            );
            let cookies = cookies_from_headers(response.headers());
            black_box(build_response("bench", response, &cookies).await.unwrap())
        })
    });
}

fn bench_ja3(c: &mut Criterion) {
    c.bench_function("ja3_parse", |b| {
        b.iter(|| black_box(black_box(CHROME_JA3).parse::<Ja3Spec>().unwrap()))
    });

    let spec: Ja3Spec = CHROME_JA3.parse().unwrap();
    c.bench_function("ja3_to_tls_options", |b| {
        b.iter(|| black_box(spec.to_tls_options()))
    });
}

criterion_group!(benches, bench_build_request, bench_build_response, bench_ja3);
criterion_main!(benches);
