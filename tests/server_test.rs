use std::net::SocketAddr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use latticeflow::config::AppConfig;
use latticeflow::server::{router, AppState};
use latticeflow::FigureSize;
use scraper::{Html, Selector};

async fn spawn_server() -> SocketAddr {
    let config = AppConfig {
        figure_size: FigureSize { width: 900, height: 600 },
        ..AppConfig::default()
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(AppState::new(config))).await.unwrap();
    });
    addr
}

fn form(price: &str, weeks: &str, volatility: &str, steps: &str) -> Vec<(&'static str, String)> {
    vec![
        ("stock_price", price.to_string()),
        ("time", weeks.to_string()),
        ("volatility", volatility.to_string()),
        ("steps", steps.to_string()),
    ]
}

#[tokio::test]
async fn test_index_serves_form() {
    let addr = spawn_server().await;
    let body = reqwest::get(format!("http://{addr}/")).await.unwrap().text().await.unwrap();

    let doc = Html::parse_document(&body);
    let inputs = Selector::parse("form input").unwrap();
    let names: Vec<&str> = doc.select(&inputs).filter_map(|i| i.value().attr("name")).collect();
    assert_eq!(names, ["stock_price", "time", "volatility", "steps"]);
    assert!(doc.select(&Selector::parse("img").unwrap()).next().is_none());
}

#[tokio::test]
async fn test_post_embeds_rendered_lattice() {
    let addr = spawn_server().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/"))
        .form(&form("18", "52", "0.2", "2"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let body = resp.text().await.unwrap();
    let doc = Html::parse_document(&body);
    let selector = Selector::parse("img#lattice").unwrap();
    let img = doc.select(&selector).next().expect("no lattice image");
    let src = img.value().attr("src").unwrap();
    let encoded = src.strip_prefix("data:image/svg+xml;base64,").expect("not an inline svg");

    let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
    for label in ["$18.00", "$20.73", "$15.63", "$23.88", "$13.57", "n=2"] {
        assert!(svg.contains(label), "missing {label}");
    }
}

#[tokio::test]
async fn test_post_too_many_steps_shows_error() {
    let addr = spawn_server().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/"))
        .form(&form("18", "52", "0.2", "13"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    let doc = Html::parse_document(&resp.text().await.unwrap());
    let error = doc.select(&Selector::parse("p.error").unwrap()).next().expect("no error message");
    assert!(error.text().collect::<String>().contains("too many steps"));
    assert!(doc.select(&Selector::parse("img").unwrap()).next().is_none());
}

#[tokio::test]
async fn test_post_rejects_zero_volatility() {
    let addr = spawn_server().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/"))
        .form(&form("18", "52", "0", "4"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("volatility"));
}

#[tokio::test]
async fn test_post_malformed_steps_shows_error_page() {
    let addr = spawn_server().await;
    for steps in ["abc", "-3", "2.5"] {
        let resp = reqwest::Client::new()
            .post(format!("http://{addr}/"))
            .form(&form("18", "52", "0.2", steps))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY, "steps={steps}");

        let doc = Html::parse_document(&resp.text().await.unwrap());
        let error = doc
            .select(&Selector::parse("p.error").unwrap())
            .next()
            .unwrap_or_else(|| panic!("no error paragraph for steps={steps}"));
        assert!(error.text().collect::<String>().contains("invalid form input"));
        assert!(doc.select(&Selector::parse("form").unwrap()).next().is_some());
        assert!(doc.select(&Selector::parse("img").unwrap()).next().is_none());
    }
}

#[tokio::test]
async fn test_api_malformed_query_is_json_error() {
    let addr = spawn_server().await;
    let resp = reqwest::get(format!(
        "http://{addr}/api/lattice?stock_price=18&time=52&volatility=0.2&steps=many"
    ))
    .await
    .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("invalid query"));
}

#[tokio::test]
async fn test_api_lattice_json() {
    let addr = spawn_server().await;
    let body: serde_json::Value = reqwest::get(format!(
        "http://{addr}/api/lattice?stock_price=18&time=52&volatility=0.2&steps=12"
    ))
    .await
    .unwrap()
    .json()
    .await
    .unwrap();

    assert_eq!(body["levels"].as_array().unwrap().len(), 13);
    assert_eq!(body["nodes"].as_array().unwrap().len(), 13 * 14 / 2);
    assert_eq!(body["edges"].as_array().unwrap().len(), 12 * 13);
    assert!((body["params"]["time_horizon"].as_f64().unwrap() - 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_health() {
    let addr = spawn_server().await;
    let body = reqwest::get(format!("http://{addr}/health")).await.unwrap().text().await.unwrap();
    assert_eq!(body, "ok");
}
