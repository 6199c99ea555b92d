use chrono::NaiveDate;
use funnel_topics::http::Method;
use funnel_topics::model::FunnelStage;
use funnel_topics::testing::{ScriptedTransport, candidate_envelope};
use funnel_topics::{AppConfig, BusinessDetails, Error, ErrorKind, Pipeline, SessionContext};
use serde_json::{Value, json};
use std::sync::Arc;

const HOME: &str = "https://acme.test/";
const PRICING: &str = "https://acme.test/pricing";

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
}

fn config() -> AppConfig {
    AppConfig::from_json(r#"{"retry_delay_ms": 0}"#).unwrap()
}

fn site() -> ScriptedTransport {
    ScriptedTransport::new()
        .with_page(
            HOME,
            "<html><head><title>Acme Backup</title></head><body>\
             <h1>Acme Backup</h1>\
             <p>Acme sells cloud backup software to small and medium businesses.</p>\
             <a href=\"/pricing\">Pricing</a><a href=\"mailto:sales@acme.test\">Email</a>\
             </body></html>",
        )
        .with_page(
            PRICING,
            "<html><head><title>Pricing</title></head><body>\
             <p>Plans start at ten dollars per month for five devices.</p></body></html>",
        )
}

fn profile_json() -> String {
    json!({
        "industry": "b2b saas",
        "tone": "Friendly",
        "targetAudienceAndPainPoints": "SMB owners worried about losing files",
        "servicesAndProducts": [{
            "name": "Cloud Backup",
            "associatedIndustry": "B2B SaaS",
            "associatedAudience": "SMB owners",
            "associatedPainPoint": "Data loss"
        }],
        "targetLocation": "",
        "guidelinesSummary": "Plain, friendly language."
    })
    .to_string()
}

fn topics(prefix: &str, destinations: &[&str]) -> Value {
    let topics: Vec<Value> = destinations
        .iter()
        .enumerate()
        .map(|(i, destination)| {
            json!({
                "title": format!("{} idea {}: backups that just work", prefix, i + 1),
                "headline": "Headline",
                "rationale": "Matches the stage and audience",
                "anchorText": "Acme Backup",
                "destinationPage": destination,
                "focusKeyword": "cloud backup"
            })
        })
        .collect();
    Value::Array(topics)
}

fn funnel(stage: &str, destinations: &[&str]) -> Value {
    json!({
        "funnelStage": stage,
        "audiences": [{
            "audienceName": "SMB owners",
            "publications": [{
                "publicationNiche": "Small business blogs",
                "topics": topics(stage, destinations)
            }]
        }]
    })
}

/// Response listing funnels out of order, one invented destination and one unknown stage
fn tree_json() -> String {
    let valid = [PRICING, HOME, PRICING];
    json!({
        "productBasedTopics": [{
            "name": "Cloud Backup",
            "funnels": [
                funnel("BoFu", &valid),
                funnel("ToFu", &[PRICING, "https://acme.test/made-up", HOME]),
                funnel("Retention", &valid),
                funnel("MoFu", &valid)
            ]
        }],
        "timelyTopics": [{
            "name": "World Backup Day",
            "funnels": [funnel("ToFu", &valid)]
        }]
    })
    .to_string()
}

fn post_payloads(transport: &ScriptedTransport) -> Vec<Value> {
    transport
        .requests_with(Method::Post)
        .iter()
        .map(|r| serde_json::from_str(r.body.as_deref().unwrap()).unwrap())
        .collect()
}

fn user_context(payload: &Value) -> &str {
    payload["contents"][0]["parts"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_scrape_analyze_generate() {
    let transport = Arc::new(site());
    transport.push_response(200, candidate_envelope(&profile_json()));
    transport.push_response(200, candidate_envelope(&tree_json()));

    let pipeline = Pipeline::from_config(transport.clone(), &config()).unwrap();
    let session = SessionContext::new("test-key", BusinessDetails::default());
    let output = pipeline.run(session, Some("acme.test"), date()).await.unwrap();

    // Session auto-filled from the scrape
    let scrape = output.session.scrape.as_ref().unwrap();
    assert_eq!(scrape.base_url, HOME);
    assert_eq!(scrape.profile.industry, "B2B SaaS");
    assert_eq!(output.session.details.product, "Cloud Backup");

    let payloads = post_payloads(&transport);
    assert_eq!(payloads.len(), 2);
    assert!(user_context(&payloads[0]).contains("cloud backup software"));

    let context = user_context(&payloads[1]);
    assert!(context.starts_with("Current Date: March 3, 2026\n"));
    assert!(context.contains("Base URL: https://acme.test/\n"));
    assert!(context.contains("1. https://acme.test/ (title: Acme Backup)"));
    assert!(context.contains("2. https://acme.test/pricing (title: Pricing)"));
    assert!(context.contains("Full Copywriting Guidelines:"));
    // Every auto-filled field equals what the scrape produced
    assert!(!context.contains("Supplemental Details"));

    // 3 known product funnels + 1 timely funnel, 3 topics each
    assert_eq!(output.rows.len(), 12);
    let stages: Vec<FunnelStage> = output.rows[..9].iter().map(|r| r.stage).collect();
    assert!(stages.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(stages[0], FunnelStage::ToFu);
    assert_eq!(stages[8], FunnelStage::BoFu);

    for row in &output.rows {
        let destination = row.destination_page.as_deref().unwrap();
        assert!(destination == HOME || destination == PRICING, "unexpected {}", destination);
    }
}

#[tokio::test]
async fn test_guidelines_only_generation() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_response(200, candidate_envelope(&tree_json()));

    let pipeline = Pipeline::from_config(transport.clone(), &config()).unwrap();
    let details = BusinessDetails {
        guidelines: "Acme sells cloud backup software to SMBs, friendly tone".into(),
        ..Default::default()
    };
    let output = pipeline
        .run(SessionContext::new("test-key", details), None, date())
        .await
        .unwrap();

    let payload = &post_payloads(&transport)[0];
    assert!(user_context(payload).contains("---\nAcme sells cloud backup software to SMBs, friendly tone\n---"));
    assert!(!user_context(payload).contains("Base URL"));
    assert_eq!(
        payload["generationConfig"]["responseSchema"]["properties"]["productBasedTopics"]["items"]["properties"]
            ["funnels"]["items"]["properties"]["funnelStage"]["enum"],
        json!(["ToFu", "MoFu", "BoFu"])
    );

    let subject = &output.tree.product_based_topics[0];
    assert!(subject.name.len() < "Acme sells cloud backup software to SMBs, friendly tone".len());
    for stage in FunnelStage::ALL {
        let count = output
            .rows
            .iter()
            .filter(|r| r.subject == subject.name && r.stage == stage)
            .count();
        assert!(count >= 3, "{} has {} topics", stage, count);
    }
    assert!(output.rows.iter().all(|r| r.title.chars().count() <= 60));

    // Without a scraped page list the destinations are left as generated
    assert!(
        output
            .rows
            .iter()
            .any(|r| r.destination_page.as_deref() == Some("https://acme.test/made-up"))
    );
}

#[tokio::test]
async fn test_differing_field_kept_as_supplemental() {
    let transport = Arc::new(site());
    transport.push_response(200, candidate_envelope(&profile_json()));
    transport.push_response(200, candidate_envelope(&tree_json()));

    let pipeline = Pipeline::from_config(transport.clone(), &config()).unwrap();
    let details = BusinessDetails {
        tone: "Formal and precise".into(),
        industry: "B2B SaaS".into(),
        ..Default::default()
    };
    pipeline
        .run(SessionContext::new("test-key", details), Some(HOME), date())
        .await
        .unwrap();

    let context = post_payloads(&transport)[1]["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(context.contains("Supplemental Details from Optional Fields:"));
    assert!(context.contains("- Specific Branding Tone/Voice: Formal and precise"));
    assert!(!context.contains("Specific Industry/Niche"));
}

#[tokio::test]
async fn test_start_page_failure_aborts_before_analysis() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(HOME, Ok(funnel_topics::http::HttpResponse::new(503, "down")));

    let pipeline = Pipeline::from_config(transport.clone(), &config()).unwrap();
    let err = pipeline
        .run(SessionContext::new("test-key", BusinessDetails::default()), Some(HOME), date())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Scrape(_)));
    assert_eq!(err.kind(), ErrorKind::Scrape);
    assert!(transport.requests_with(Method::Post).is_empty());
}

#[tokio::test]
async fn test_generation_errors_are_distinguishable() {
    let details = || BusinessDetails {
        guidelines: "Acme sells cloud backup software".into(),
        ..Default::default()
    };

    let cases: Vec<(Vec<(u16, String)>, ErrorKind)> = vec![
        (
            vec![(400, r#"{"error": {"code": 400, "message": "bad", "status": "INVALID_ARGUMENT"}}"#.into())],
            ErrorKind::Client,
        ),
        (vec![(500, "a".into()), (502, "b".into()), (503, "c".into())], ErrorKind::Server),
        (vec![(200, r#"{"candidates": []}"#.into())], ErrorKind::MissingContent),
        (vec![(200, candidate_envelope("not json"))], ErrorKind::ResponseShape),
    ];

    for (responses, expected) in cases {
        let transport = Arc::new(ScriptedTransport::new());
        for (status, body) in responses {
            transport.push_response(status, body);
        }
        let pipeline = Pipeline::from_config(transport, &config()).unwrap();
        let err = pipeline
            .run(SessionContext::new("test-key", details()), None, date())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), expected, "{}", err);
    }
}

#[tokio::test]
async fn test_redirected_site_uses_final_host_for_destinations() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_redirect(
                "https://www.acme.test/",
                HOME,
                "<html><head><title>Acme Backup</title></head><body>\
                 <p>Acme sells cloud backup software to small and medium businesses.</p>\
                 <a href=\"https://acme.test/pricing\">Pricing</a></body></html>",
            )
            .with_page(
                PRICING,
                "<html><head><title>Pricing</title></head><body><p>Plans start at ten dollars.</p></body></html>",
            ),
    );
    transport.push_response(200, candidate_envelope(&profile_json()));

    let pipeline = Pipeline::from_config(transport.clone(), &config()).unwrap();
    let scrape = pipeline.analyze_site("www.acme.test", "test-key").await.unwrap();

    assert_eq!(scrape.base_url, HOME);
    assert_eq!(scrape.candidate_urls(), vec![HOME, PRICING]);
}
