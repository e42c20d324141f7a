use std::sync::Arc;

use crate::assessment::AssessmentService;
use crate::config::Config;
use crate::database::DatabaseManager;
use crate::openai::OpenAIClient;
use crate::rubric::Rubric;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AssessmentService>,
    pub db: Arc<DatabaseManager>,
    pub openai: Arc<OpenAIClient>,
    pub rubric: Arc<Rubric>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, db: Arc<DatabaseManager>) -> Self {
        let config = Arc::new(config);
        let rubric = Arc::new(Rubric::new());
        let openai = Arc::new(OpenAIClient::new(&config, rubric.clone()));
        let service = Arc::new(AssessmentService::new(db.clone(), openai.clone()));

        Self {
            service,
            db,
            openai,
            rubric,
            config,
        }
    }
}
