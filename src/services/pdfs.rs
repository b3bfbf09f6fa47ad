use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use crate::models::pdfs::{NewPdf, PdfUpdate, UserPdf};
use crate::repositories::{PdfStore, ProfileStore};

use super::{RequestHandler, Service, ServiceError};

pub enum PdfRequest {
    List {
        user_id: String,
        response: oneshot::Sender<Result<Vec<UserPdf>, ServiceError>>,
    },
    Register {
        user_id: String,
        email: String,
        pdf: NewPdf,
        response: oneshot::Sender<Result<UserPdf, ServiceError>>,
    },
    Update {
        user_id: String,
        pdf_id: String,
        update: PdfUpdate,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
}

/// PDF management is a premium feature: registration is gated on effective
/// premium status, while reading progress on already-registered documents
/// stays available.
#[derive(Clone)]
pub struct PdfRequestHandler {
    profiles: Arc<dyn ProfileStore>,
    pdfs: Arc<dyn PdfStore>,
}

impl PdfRequestHandler {
    pub fn new(profiles: Arc<dyn ProfileStore>, pdfs: Arc<dyn PdfStore>) -> Self {
        PdfRequestHandler { profiles, pdfs }
    }

    async fn list(&self, user_id: &str) -> Result<Vec<UserPdf>, ServiceError> {
        self.pdfs
            .list_pdfs(user_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn register(
        &self,
        user_id: &str,
        email: &str,
        pdf: NewPdf,
    ) -> Result<UserPdf, ServiceError> {
        let profile = self
            .profiles
            .get_profile(user_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let profile = match profile {
            Some(profile) => profile,
            None => self
                .profiles
                .create_default_profile(user_id, email)
                .await
                .map_err(|e| ServiceError::Database(e.to_string()))?,
        };

        if !profile.effective_premium(Utc::now()) {
            return Err(ServiceError::PremiumRequired);
        }

        self.pdfs
            .insert_pdf(user_id, pdf)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn update(
        &self,
        user_id: &str,
        pdf_id: &str,
        update: PdfUpdate,
    ) -> Result<(), ServiceError> {
        self.pdfs
            .update_pdf(user_id, pdf_id, update)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

#[async_trait]
impl RequestHandler<PdfRequest> for PdfRequestHandler {
    async fn handle_request(&self, request: PdfRequest) {
        match request {
            PdfRequest::List { user_id, response } => {
                let pdfs = self.list(&user_id).await;
                let _ = response.send(pdfs);
            }
            PdfRequest::Register {
                user_id,
                email,
                pdf,
                response,
            } => {
                let pdf = self.register(&user_id, &email, pdf).await;
                let _ = response.send(pdf);
            }
            PdfRequest::Update {
                user_id,
                pdf_id,
                update,
                response,
            } => {
                let result = self.update(&user_id, &pdf_id, update).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct PdfService;

impl PdfService {
    pub fn new() -> Self {
        PdfService {}
    }
}

#[async_trait]
impl Service<PdfRequest, PdfRequestHandler> for PdfService {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profiles::UserProfile;
    use chrono::{DateTime, Duration};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct FakeProfileStore {
        is_premium: bool,
        premium_expiry: Option<DateTime<Utc>>,
    }

    #[async_trait]
    impl ProfileStore for FakeProfileStore {
        async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, anyhow::Error> {
            Ok(Some(UserProfile {
                id: user_id.to_string(),
                email: "user@example.com".to_string(),
                query_usage_current_month: 0,
                is_premium: self.is_premium,
                premium_expiry: self.premium_expiry,
                created_at: Utc::now(),
            }))
        }

        async fn create_default_profile(
            &self,
            user_id: &str,
            email: &str,
        ) -> Result<UserProfile, anyhow::Error> {
            Ok(UserProfile {
                id: user_id.to_string(),
                email: email.to_string(),
                query_usage_current_month: 0,
                is_premium: false,
                premium_expiry: None,
                created_at: Utc::now(),
            })
        }

        async fn increment_usage(&self, _user_id: &str) -> Result<(), anyhow::Error> {
            Ok(())
        }
    }

    struct FakePdfStore {
        pdfs: Mutex<Vec<UserPdf>>,
    }

    impl FakePdfStore {
        fn empty() -> Self {
            FakePdfStore {
                pdfs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PdfStore for FakePdfStore {
        async fn list_pdfs(&self, user_id: &str) -> Result<Vec<UserPdf>, anyhow::Error> {
            let pdfs = self.pdfs.lock().unwrap();
            Ok(pdfs
                .iter()
                .filter(|pdf| pdf.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn insert_pdf(&self, user_id: &str, pdf: NewPdf) -> Result<UserPdf, anyhow::Error> {
            let inserted = UserPdf {
                id: Uuid::new_v4().hyphenated().to_string(),
                user_id: user_id.to_string(),
                filename: pdf.filename,
                storage_path: pdf.storage_path,
                last_page: pdf.last_page,
                annotations: pdf.annotations,
                uploaded_at: Utc::now(),
            };
            self.pdfs.lock().unwrap().push(inserted.clone());
            Ok(inserted)
        }

        async fn update_pdf(
            &self,
            user_id: &str,
            pdf_id: &str,
            update: PdfUpdate,
        ) -> Result<(), anyhow::Error> {
            let mut pdfs = self.pdfs.lock().unwrap();
            for pdf in pdfs
                .iter_mut()
                .filter(|pdf| pdf.user_id == user_id && pdf.id == pdf_id)
            {
                if let Some(last_page) = update.last_page {
                    pdf.last_page = last_page;
                }
                if let Some(annotations) = update.annotations.clone() {
                    pdf.annotations = Some(annotations);
                }
            }
            Ok(())
        }
    }

    fn new_pdf(filename: &str) -> NewPdf {
        NewPdf {
            filename: filename.to_string(),
            storage_path: format!("pdfs/{filename}"),
            last_page: 1,
            annotations: None,
        }
    }

    fn handler(profiles: FakeProfileStore, pdfs: Arc<FakePdfStore>) -> PdfRequestHandler {
        PdfRequestHandler::new(Arc::new(profiles), pdfs)
    }

    #[tokio::test]
    async fn free_account_cannot_register_a_pdf() {
        let pdfs = Arc::new(FakePdfStore::empty());
        let handler = handler(
            FakeProfileStore {
                is_premium: false,
                premium_expiry: None,
            },
            Arc::clone(&pdfs),
        );

        let err = handler
            .register("user-1", "user@example.com", new_pdf("grammar.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::PremiumRequired));
        assert!(pdfs.pdfs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn premium_account_registers_a_pdf() {
        let pdfs = Arc::new(FakePdfStore::empty());
        let handler = handler(
            FakeProfileStore {
                is_premium: true,
                premium_expiry: Some(Utc::now() + Duration::days(30)),
            },
            Arc::clone(&pdfs),
        );

        let pdf = handler
            .register("user-1", "user@example.com", new_pdf("grammar.pdf"))
            .await
            .unwrap();

        assert_eq!(pdf.filename, "grammar.pdf");
        assert_eq!(pdf.last_page, 1);
        assert_eq!(pdfs.pdfs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lapsed_premium_cannot_register_a_pdf() {
        let pdfs = Arc::new(FakePdfStore::empty());
        let handler = handler(
            FakeProfileStore {
                is_premium: true,
                premium_expiry: Some(Utc::now() - Duration::days(1)),
            },
            Arc::clone(&pdfs),
        );

        let err = handler
            .register("user-1", "user@example.com", new_pdf("grammar.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::PremiumRequired));
    }

    #[tokio::test]
    async fn progress_update_touches_only_the_given_fields() {
        let pdfs = Arc::new(FakePdfStore::empty());
        let handler = handler(
            FakeProfileStore {
                is_premium: true,
                premium_expiry: None,
            },
            Arc::clone(&pdfs),
        );

        let pdf = handler
            .register("user-1", "user@example.com", new_pdf("grammar.pdf"))
            .await
            .unwrap();

        handler
            .update(
                "user-1",
                &pdf.id,
                PdfUpdate {
                    last_page: Some(42),
                    annotations: None,
                },
            )
            .await
            .unwrap();

        let stored = pdfs.pdfs.lock().unwrap();
        assert_eq!(stored[0].last_page, 42);
        assert_eq!(stored[0].annotations, None);
    }
}
