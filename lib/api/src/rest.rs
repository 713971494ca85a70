use actix_cors::Cors;
use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult};
use estate_core::{Error, MarketAnalytics};
use estate_predict::FeatureRecord;
use estate_similarity::{RecommendResponse, DEFAULT_TOP_N};
use estate_storage::{ContextSummary, EstateContext};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

type Context = web::Data<Arc<EstateContext>>;

#[derive(Deserialize)]
struct RecommendQuery {
    top_n: Option<i64>,
    #[serde(default)]
    explain: bool,
}

#[derive(Deserialize)]
struct NearbyQuery {
    radius_km: Option<f64>,
}

#[derive(Serialize)]
struct NearbyResult {
    property: String,
    distance_m: f64,
}

#[derive(Serialize)]
struct NearbyResponse {
    location: String,
    radius_km: f64,
    result: Vec<NearbyResult>,
}

#[derive(Serialize)]
struct ServiceInfo {
    service: &'static str,
    version: &'static str,
    #[serde(flatten)]
    summary: ContextSummary,
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct SectorQuery {
    sector: Option<String>,
}

#[derive(Deserialize)]
struct BedroomPriceQuery {
    max_bedrooms: Option<f64>,
}

#[derive(Deserialize)]
struct BinsQuery {
    bins: Option<usize>,
}

#[derive(Deserialize)]
struct PropertyTypeQuery {
    property_type: Option<String>,
}

#[derive(Deserialize)]
struct FeatureQuery {
    sector: Option<String>,
    limit: Option<usize>,
}

const DEFAULT_LUXURY_LIMIT: usize = 10;
const DEFAULT_MAX_BEDROOMS: f64 = 4.0;
const DEFAULT_BINS: usize = 20;
const DEFAULT_TERM_LIMIT: usize = 50;

pub struct RestApi;

impl RestApi {
    pub async fn start(ctx: Arc<EstateContext>, host: String, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(ctx.clone()))
                .configure(Self::configure)
        })
        .bind((host.as_str(), port))?
        .run()
        .await
    }

    /// Register every route on an app or scope
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .route("/", web::get().to(service_info))
            .route("/properties", web::get().to(list_properties))
            .route("/properties/{id}/recommendations", web::get().to(recommend))
            .route("/locations", web::get().to(list_locations))
            .route("/locations/{name}/nearby", web::get().to(nearby))
            .route("/predict", web::post().to(predict))
            .route("/predict/options", web::get().to(predict_options))
            .route("/analytics/sectors", web::get().to(sector_summary))
            .route("/analytics/luxury", web::get().to(luxury_sectors))
            .route("/analytics/bedrooms", web::get().to(bedroom_distribution))
            .route("/analytics/bedroom-prices", web::get().to(bedroom_prices))
            .route("/analytics/sector-prices", web::get().to(sector_prices))
            .route("/analytics/area-price", web::get().to(area_price))
            .route("/analytics/property-types", web::get().to(property_type_prices))
            .route("/analytics/rooms", web::get().to(room_availability))
            .route("/analytics/features", web::get().to(feature_terms));
    }
}

/// Map a service error onto an HTTP status with a `{"error": ...}` body
fn error_response(e: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_caller_error() {
        debug!("Rejected request: {}", e);
    } else {
        error!("Request failed: {}", e);
    }
    match e {
        Error::PropertyNotFound(_) | Error::LocationNotFound(_) | Error::NotFound { .. } => {
            HttpResponse::NotFound().json(body)
        }
        Error::InvalidArgument(_) => HttpResponse::BadRequest().json(body),
        Error::Validation { .. } => HttpResponse::UnprocessableEntity().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

/// Unreadable request bodies get the same JSON error shape as rejected records
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(&Error::validation("body", err.to_string()));
    InternalError::from_response(err, response).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(&Error::InvalidArgument(err.to_string()));
    InternalError::from_response(err, response).into()
}

fn respond<T: Serialize>(result: estate_core::Result<T>) -> ActixResult<HttpResponse> {
    match result {
        Ok(value) => Ok(HttpResponse::Ok().json(value)),
        Err(e) => Ok(error_response(&e)),
    }
}

fn with_analytics<T: Serialize>(
    ctx: &EstateContext,
    f: impl FnOnce(&MarketAnalytics) -> estate_core::Result<T>,
) -> ActixResult<HttpResponse> {
    match ctx.analytics() {
        Some(analytics) => respond(f(analytics)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "Listings dataset not loaded"
        }))),
    }
}

async fn service_info(ctx: Context) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ServiceInfo {
        service: "estate",
        version: env!("CARGO_PKG_VERSION"),
        summary: ctx.summary(),
    }))
}

async fn list_properties(ctx: Context) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": ctx.properties().sorted_ids()
    })))
}

async fn recommend(
    ctx: Context,
    path: web::Path<String>,
    query: web::Query<RecommendQuery>,
) -> ActixResult<HttpResponse> {
    let property = path.into_inner();
    let top_n = match query.top_n {
        None => DEFAULT_TOP_N,
        Some(n) if n < 0 => {
            return Ok(error_response(&Error::InvalidArgument(format!(
                "top_n must be positive, got {}",
                n
            ))))
        }
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
    };

    let recommender = ctx.recommender();
    respond(
        recommender
            .recommend(&property, top_n)
            .map(|recs| RecommendResponse::new(&property, recs, recommender.store(), query.explain)),
    )
}

async fn list_locations(ctx: Context) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": ctx.proximity().sorted_locations()
    })))
}

async fn nearby(
    ctx: Context,
    path: web::Path<String>,
    query: web::Query<NearbyQuery>,
) -> ActixResult<HttpResponse> {
    let location = path.into_inner();
    let Some(radius_km) = query.radius_km else {
        return Ok(error_response(&Error::InvalidArgument(
            "radius_km is required".to_string(),
        )));
    };

    respond(ctx.proximity().nearby(&location, radius_km).map(|hits| NearbyResponse {
        location: location.clone(),
        radius_km,
        result: hits
            .into_iter()
            .map(|(property, distance_m)| NearbyResult {
                property: property.to_string(),
                distance_m,
            })
            .collect(),
    }))
}

async fn predict(ctx: Context, body: web::Json<serde_json::Value>) -> ActixResult<HttpResponse> {
    let record: FeatureRecord = match serde_json::from_value(body.into_inner()) {
        Ok(record) => record,
        Err(e) => return Ok(error_response(&Error::validation("body", e.to_string()))),
    };
    respond(ctx.predictor().predict(&record))
}

async fn predict_options(ctx: Context) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ctx.predictor().options()))
}

async fn sector_summary(ctx: Context) -> ActixResult<HttpResponse> {
    with_analytics(&ctx, |a| Ok(a.sector_summary()))
}

async fn luxury_sectors(ctx: Context, query: web::Query<LimitQuery>) -> ActixResult<HttpResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LUXURY_LIMIT);
    with_analytics(&ctx, |a| a.top_luxury_sectors(limit))
}

async fn bedroom_distribution(
    ctx: Context,
    query: web::Query<SectorQuery>,
) -> ActixResult<HttpResponse> {
    with_analytics(&ctx, |a| a.bedroom_distribution(query.sector.as_deref()))
}

async fn bedroom_prices(
    ctx: Context,
    query: web::Query<BedroomPriceQuery>,
) -> ActixResult<HttpResponse> {
    let max_bedrooms = query.max_bedrooms.unwrap_or(DEFAULT_MAX_BEDROOMS);
    with_analytics(&ctx, |a| Ok(a.price_by_bedroom(max_bedrooms)))
}

async fn sector_prices(ctx: Context) -> ActixResult<HttpResponse> {
    with_analytics(&ctx, |a| Ok(a.price_by_sector()))
}

async fn area_price(
    ctx: Context,
    query: web::Query<PropertyTypeQuery>,
) -> ActixResult<HttpResponse> {
    with_analytics(&ctx, |a| a.area_price_points(query.property_type.as_deref()))
}

async fn property_type_prices(
    ctx: Context,
    query: web::Query<BinsQuery>,
) -> ActixResult<HttpResponse> {
    let bins = query.bins.unwrap_or(DEFAULT_BINS);
    with_analytics(&ctx, |a| a.price_by_property_type(bins))
}

async fn room_availability(
    ctx: Context,
    query: web::Query<PropertyTypeQuery>,
) -> ActixResult<HttpResponse> {
    with_analytics(&ctx, |a| a.room_availability(query.property_type.as_deref()))
}

async fn feature_terms(ctx: Context, query: web::Query<FeatureQuery>) -> ActixResult<HttpResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_TERM_LIMIT);
    with_analytics(&ctx, |a| a.feature_terms(query.sector.as_deref(), limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use estate_core::{
        FeatureText, ListingRecord, PropertyIndex, ProximityIndex, ProximityTable, SimilarityMatrix,
    };
    use estate_predict::{CategoricalTerm, LinearPipeline, LinearPipelineSpec, NumericTerm, PricePredictor};
    use estate_similarity::{Recommender, SimilarityStore};
    use serde_json::{json, Value};

    fn pipeline() -> LinearPipelineSpec {
        let numeric = ["bedRoom", "bathroom", "built_up_area", "servant room", "store room"]
            .into_iter()
            .map(|c| NumericTerm {
                column: c.to_string(),
                mean: 0.0,
                scale: 1.0,
                coef: 0.0,
            })
            .collect();
        let one_hot = |column: &str, categories: &[&str]| CategoricalTerm {
            column: column.to_string(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            coefs: vec![0.0; categories.len()],
        };
        LinearPipelineSpec {
            // log1p(2.0)
            intercept: 2.0f64.ln_1p(),
            numeric,
            categorical: vec![
                one_hot("property_type", &["flat", "house"]),
                one_hot("sector", &["sector 45", "sector 12"]),
                one_hot("balcony", &["2", "3+"]),
                one_hot("agePossession", &["New Property"]),
                one_hot("furnishing_type", &["unfurnished"]),
                one_hot("luxury_category", &["Low"]),
                one_hot("floor_category", &["Low Floor"]),
            ],
        }
    }

    fn listing(property_type: &str, sector: &str, price: f64, bedrooms: f64) -> ListingRecord {
        ListingRecord {
            property_type: property_type.to_string(),
            sector: sector.to_string(),
            price,
            price_per_sqft: price * 1e7 / 1500.0,
            built_up_area: 1500.0,
            bedrooms,
            bathrooms: 2.0,
            latitude: Some(28.4),
            longitude: Some(77.0),
            luxury_score: Some(50.0),
            furnishing_type: None,
            servant_room: 1.0,
            study_room: 0.0,
            pooja_room: 0.0,
            store_room: 1.0,
            others: 0.0,
        }
    }

    fn context(with_analytics: bool) -> Arc<EstateContext> {
        let index = Arc::new(PropertyIndex::new(vec!["A".into(), "B".into(), "C".into()]).unwrap());
        let m = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.2, 0.9],
            vec![0.2, 1.0, 0.3],
            vec![0.9, 0.3, 1.0],
        ])
        .unwrap();
        let store = SimilarityStore::new(index.clone(), [m.clone(), m.clone(), m]).unwrap();
        let recommender = Recommender::new(store).unwrap();

        let table = ProximityTable {
            index: vec!["A".into(), "B".into(), "C".into()],
            columns: vec!["DLF Phase 2".to_string()],
            data: vec![vec![Some(500.0)], vec![Some(1000.0)], vec![Some(2500.0)]],
        };
        let proximity = ProximityIndex::new(index, table).unwrap();
        let predictor = PricePredictor::new(Arc::new(LinearPipeline::from_spec(pipeline()).unwrap()));

        let analytics = with_analytics.then(|| {
            MarketAnalytics::new(
                vec![
                    listing("flat", "sector 45", 1.0, 2.0),
                    listing("flat", "sector 45", 1.4, 3.0),
                    listing("house", "sector 12", 4.0, 4.0),
                ],
                vec![FeatureText {
                    sector: "sector 45".to_string(),
                    feature: "Swimming Pool, Gym, Swimming Area, Swimming Pool".to_string(),
                }],
            )
        });

        Arc::new(EstateContext::from_parts(recommender, proximity, predictor, analytics).unwrap())
    }

    macro_rules! app {
        ($ctx:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($ctx))
                    .configure(RestApi::configure),
            )
            .await
        };
    }

    async fn get(ctx: Arc<EstateContext>, uri: &str) -> (StatusCode, Value) {
        let app = app!(ctx);
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    fn record() -> Value {
        json!({
            "property_type": "flat",
            "sector": "sector 45",
            "bedRoom": 3,
            "bathroom": 2,
            "balcony": "2",
            "agePossession": "New Property",
            "built_up_area": 1500,
            "servant room": 0,
            "store room": 1,
            "furnishing_type": "unfurnished",
            "luxury_category": "Low",
            "floor_category": "Low Floor"
        })
    }

    #[actix_web::test]
    async fn test_service_info() {
        let (status, body) = get(context(true), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "estate");
        assert_eq!(body["properties"], 3);
        assert_eq!(body["locations"], 1);
        assert_eq!(body["listings"], 3);
    }

    #[actix_web::test]
    async fn test_recommendations() {
        let (status, body) = get(context(false), "/properties/A/recommendations?top_n=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["property"], "A");
        assert_eq!(body["result"].as_array().unwrap().len(), 1);
        assert_eq!(body["result"][0]["property"], "C");
        assert!(body["result"][0].get("explain").is_none());
    }

    #[actix_web::test]
    async fn test_recommendations_explain() {
        let (_, body) = get(context(false), "/properties/A/recommendations?explain=true").await;
        assert_eq!(body["result"].as_array().unwrap().len(), 2);
        assert!(body["result"][0]["explain"]["sim3"].is_number());
        assert_eq!(body["stats"]["candidates_count"], 2);
    }

    #[actix_web::test]
    async fn test_recommendation_errors() {
        let (status, body) = get(context(false), "/properties/Z/recommendations").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("Z"));

        let (status, _) = get(context(false), "/properties/A/recommendations?top_n=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(context(false), "/properties/A/recommendations?top_n=-3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_nearby() {
        let (status, body) = get(context(false), "/locations/DLF%20Phase%202/nearby?radius_km=1").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["result"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["property"].as_str().unwrap())
            .collect();
        // 1000 m is not strictly inside 1 km
        assert_eq!(names, vec!["A"]);
    }

    #[actix_web::test]
    async fn test_nearby_errors() {
        let (status, _) = get(context(false), "/locations/Nowhere/nearby?radius_km=5").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(context(false), "/locations/DLF%20Phase%202/nearby?radius_km=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(context(false), "/locations/DLF%20Phase%202/nearby").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_listings() {
        let (_, body) = get(context(false), "/properties").await;
        assert_eq!(body["result"], json!(["A", "B", "C"]));
        let (_, body) = get(context(false), "/locations").await;
        assert_eq!(body["result"], json!(["DLF Phase 2"]));
    }

    #[actix_web::test]
    async fn test_predict() {
        let app = app!(context(false));
        let req = test::TestRequest::post().uri("/predict").set_json(record()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let estimate = body["estimate"].as_f64().unwrap();
        assert!((estimate - 2.0).abs() < 1e-9);
        assert!((body["low"].as_f64().unwrap() - 1.78).abs() < 1e-9);
        assert!((body["high"].as_f64().unwrap() - 2.22).abs() < 1e-9);
    }

    #[actix_web::test]
    async fn test_predict_validation() {
        let app = app!(context(false));

        let mut unknown_sector = record();
        unknown_sector["sector"] = json!("sector 999");
        let req = test::TestRequest::post().uri("/predict").set_json(unknown_sector).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let mut missing = record();
        missing.as_object_mut().unwrap().remove("balcony");
        let req = test::TestRequest::post().uri("/predict").set_json(missing).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_malformed_body_is_json_error() {
        let app = app!(context(false));
        let req = test::TestRequest::post()
            .uri("/predict")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_malformed_query_is_json_error() {
        for uri in [
            "/properties/A/recommendations?top_n=abc",
            "/locations/DLF%20Phase%202/nearby?radius_km=far",
            "/analytics/property-types?bins=-1",
        ] {
            let (status, body) = get(context(true), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body["error"].is_string(), "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_predict_options() {
        let (status, body) = get(context(false), "/predict/options").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["property_type"], json!(["flat", "house"]));
        assert_eq!(body["categories"]["sector"], json!(["sector 12", "sector 45"]));
    }

    #[actix_web::test]
    async fn test_analytics_routes() {
        let (status, body) = get(context(true), "/analytics/sectors").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = get(context(true), "/analytics/bedrooms?sector=sector%2045").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) = get(context(true), "/analytics/bedrooms?sector=sector%2099").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get(context(true), "/analytics/property-types?bins=4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bin_edges"].as_array().unwrap().len(), 5);

        let (status, body) = get(context(true), "/analytics/rooms?property_type=flat").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);

        let (status, body) = get(context(true), "/analytics/features?sector=sector%2045&limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["term"], "swimming");

        let (status, _) = get(context(true), "/analytics/luxury?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(context(true), "/analytics/sector-prices").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[1]["sector"], "sector 45");
        assert_eq!(body[1]["count"], 2);
        assert!((body[1]["median"].as_f64().unwrap() - 1.2).abs() < 1e-12);

        let (status, body) = get(context(true), "/analytics/area-price?property_type=house").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["built_up_area"], 1500.0);

        let (status, _) = get(context(true), "/analytics/area-price?property_type=villa").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_histogram_bins_are_capped() {
        let (status, body) = get(context(true), "/analytics/property-types?bins=18446744073709551615").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("bins"));

        let (status, _) = get(context(true), "/analytics/property-types?bins=1000").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_analytics_without_listings() {
        let (status, body) = get(context(false), "/analytics/sectors").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }
}
