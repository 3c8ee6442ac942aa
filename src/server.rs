use crate::data::EnrollmentForm;
use crate::error::PredictError;
use crate::lookup::CategoricalField;
use crate::normalize::FallbackPolicy;
use crate::pipeline::Predictor;
use actix_web::{web, App, HttpResponse, HttpServer};
use serde::Serialize;

#[derive(Serialize)]
struct PredictResponse {
    prediction: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: String,
    missing: &'a [&'static str],
    invalid: &'a [crate::data::InvalidField],
}

#[derive(Serialize)]
struct ServerError {
    error: String,
}

#[derive(Serialize)]
struct FieldOptions {
    field: CategoricalField,
    label: &'static str,
    options: Vec<SelectOption>,
}

#[derive(Serialize)]
struct SelectOption {
    code: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct ModelInfo {
    trees: usize,
    classes: Vec<i64>,
    columns: usize,
    fallback: FallbackPolicy,
}

async fn predict(
    form: web::Json<EnrollmentForm>,
    predictor: web::Data<Predictor>,
) -> HttpResponse {
    match predictor.predict(&form) {
        Ok(prediction) => HttpResponse::Ok().json(PredictResponse {
            prediction: prediction.as_str(),
        }),
        Err(PredictError::Invalid(err)) => {
            log::info!(
                "rejected submission: {} missing, {} invalid",
                err.missing.len(),
                err.invalid.len()
            );
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: err.to_string(),
                missing: &err.missing,
                invalid: &err.invalid,
            })
        }
        Err(err) => {
            log::error!("prediction failed: {err}");
            HttpResponse::InternalServerError().json(ServerError {
                error: err.to_string(),
            })
        }
    }
}

async fn get_options() -> HttpResponse {
    let fields: Vec<FieldOptions> = CategoricalField::ALL
        .iter()
        .map(|field| FieldOptions {
            field: *field,
            label: field.display_name(),
            options: field
                .table()
                .entries()
                .iter()
                .map(|&(code, label)| SelectOption { code, label })
                .collect(),
        })
        .collect();

    HttpResponse::Ok().json(fields)
}

async fn get_model_info(predictor: web::Data<Predictor>) -> HttpResponse {
    let forest = predictor.model().forest();
    HttpResponse::Ok().json(ModelInfo {
        trees: forest.trees().len(),
        classes: forest.classes().to_vec(),
        columns: predictor.model().schema().len(),
        fallback: predictor.policy(),
    })
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("Dropout Predictor API is running!")
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/predict", web::post().to(predict))
        .route("/options", web::get().to(get_options))
        .route("/model/info", web::get().to(get_model_info))
        .route("/health", web::get().to(health_check));
}

pub async fn start_api(predictor: Predictor, host: &str, port: u16) -> std::io::Result<()> {
    let predictor = web::Data::new(predictor);

    log::info!("starting Dropout Predictor API on http://{host}:{port}");
    HttpServer::new(move || {
        App::new()
            .app_data(predictor.clone())
            .configure(routes)
    })
    .bind((host, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DropoutModel, RandomForest};
    use crate::schema::ModelSchema;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    /// One stump: fees not up to date → dropout.
    fn predictor() -> Predictor {
        let schema = ModelSchema::new(vec![
            "Tuition_fees_up_to_date_Fees up to date".to_string(),
            "Tuition_fees_up_to_date_Fees NOT up to date".to_string(),
        ])
        .unwrap();
        let forest: RandomForest = serde_json::from_value(json!({
            "classes": [0, 1],
            "n_features": 2,
            "trees": [{"nodes": [
                {"kind": "split", "feature": 1, "threshold": 0.5, "left": 1, "right": 2},
                {"kind": "leaf", "value": [5.0, 1.0]},
                {"kind": "leaf", "value": [1.0, 5.0]}
            ]}]
        }))
        .unwrap();
        Predictor::new(
            DropoutModel::new(forest, schema).unwrap(),
            FallbackPolicy::NationalityOnly,
        )
    }

    fn complete_form(fees_code: &str) -> EnrollmentForm {
        let mut form = EnrollmentForm::with_default_selections();
        for field in crate::data::NumericField::ALL {
            form.set_number(field, Some(1.0));
        }
        form.age_at_enrollment = Some(19.0);
        form.tuition_fees_up_to_date = Some(fees_code.to_string());
        form
    }

    #[actix_web::test]
    async fn test_predict_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(predictor()))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(complete_form("0"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["prediction"], "will drop out");

        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(complete_form("1"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["prediction"], "not dropout");
    }

    #[actix_web::test]
    async fn test_predict_rejects_incomplete_form() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(predictor()))
                .configure(routes),
        )
        .await;

        let mut form = complete_form("1");
        form.admission_grade = None;
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(form)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["missing"], json!(["Admission grade"]));
        assert!(body.get("prediction").is_none());
    }

    #[actix_web::test]
    async fn test_float_codes_reach_validation() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(predictor()))
                .configure(routes),
        )
        .await;

        let mut body = serde_json::to_value(complete_form("1")).unwrap();
        body["tuition_fees_up_to_date"] = json!(1.0);
        let req = test::TestRequest::post().uri("/predict").set_json(&body).to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["prediction"], "not dropout");

        body["tuition_fees_up_to_date"] = json!(0.5);
        let req = test::TestRequest::post().uri("/predict").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let resp: Value = test::read_body_json(resp).await;
        assert_eq!(resp["invalid"][0]["field"], "Tuition fees up to date");
        assert!(resp["error"]
            .as_str()
            .unwrap()
            .starts_with("Some fields have invalid values."));
    }

    #[actix_web::test]
    async fn test_options_and_info() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(predictor()))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/options").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let fields = body.as_array().unwrap();
        assert_eq!(fields.len(), CategoricalField::ALL.len());
        assert_eq!(fields[4]["field"], "nationality");
        assert_eq!(fields[4]["options"][0], json!({"code": "1", "label": "Portuguese"}));

        let req = test::TestRequest::get().uri("/model/info").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["trees"], 1);
        assert_eq!(body["columns"], 2);
        assert_eq!(body["fallback"], "nationality-only");
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().configure(routes)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
