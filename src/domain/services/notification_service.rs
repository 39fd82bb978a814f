use std::sync::Arc;
use crate::domain::{models::principal::Shopkeeper, ports::EmailService};
use crate::error::AppError;
use crate::config::Config;
use tera::{Context, Tera};
use tracing::info;

pub const APPROVAL_REQUEST_TEMPLATE: &str = "approval_request.html";
pub const APPROVED_TEMPLATE: &str = "shopkeeper_approved.html";
pub const REJECTED_TEMPLATE: &str = "shopkeeper_rejected.html";

pub const DEFAULT_REJECTION_REASON: &str = "Does not meet our current marketplace requirements.";
pub const REAPPLY_AFTER_DAYS: u32 = 30;

/// Loads the registration email templates compiled into the binary.
pub fn email_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (APPROVAL_REQUEST_TEMPLATE, include_str!("../../templates/approval_request.html")),
        (APPROVED_TEMPLATE, include_str!("../../templates/shopkeeper_approved.html")),
        (REJECTED_TEMPLATE, include_str!("../../templates/shopkeeper_rejected.html")),
    ])
    .map_err(|e| AppError::InternalWithMsg(format!("Email templates failed to load: {}", e)))?;
    Ok(tera)
}

/// Links and contact details embedded in outgoing mail.
#[derive(Clone)]
pub struct MailLinks {
    pub public_base_url: String,
    pub login_url: String,
    pub support_email: String,
    pub support_url: String,
}

impl From<&Config> for MailLinks {
    fn from(config: &Config) -> Self {
        Self {
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            login_url: config.login_url.clone(),
            support_email: config.support_email.clone(),
            support_url: config.support_url.clone(),
        }
    }
}

pub struct NotificationService {
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    links: MailLinks,
}

impl NotificationService {
    pub fn new(email: Arc<dyn EmailService>, templates: Arc<Tera>, links: MailLinks) -> Self {
        Self { email, templates, links }
    }

    pub fn approval_url(&self, shopkeeper_id: &str) -> String {
        format!("{}/api/admin/approve-shopkeeper/{}", self.links.public_base_url, shopkeeper_id)
    }

    pub async fn approval_request(&self, admin_email: &str, shopkeeper: &Shopkeeper) -> Result<(), AppError> {
        let mut ctx = Context::new();
        ctx.insert("shop_name", &shopkeeper.shop_name);
        ctx.insert("owner_name", &shopkeeper.name);
        ctx.insert("license_number", &shopkeeper.license_number);
        ctx.insert("email", &shopkeeper.email);
        ctx.insert("approval_url", &self.approval_url(&shopkeeper.id));

        self.deliver(admin_email, "New Shopkeeper Approval Request", APPROVAL_REQUEST_TEMPLATE, &ctx).await
    }

    pub async fn approved(&self, shopkeeper: &Shopkeeper) -> Result<(), AppError> {
        let mut ctx = Context::new();
        ctx.insert("shop_name", &shopkeeper.shop_name);
        ctx.insert("owner_name", &shopkeeper.name);
        ctx.insert("login_url", &self.links.login_url);

        self.deliver(&shopkeeper.email, "Your Shop Registration Has Been Approved", APPROVED_TEMPLATE, &ctx).await
    }

    pub async fn rejected(&self, shopkeeper: &Shopkeeper, reason: &str) -> Result<(), AppError> {
        let mut ctx = Context::new();
        ctx.insert("shop_name", &shopkeeper.shop_name);
        ctx.insert("owner_name", &shopkeeper.name);
        ctx.insert("reason", reason);
        ctx.insert("support_email", &self.links.support_email);
        ctx.insert("support_url", &self.links.support_url);
        ctx.insert("reapply_after_days", &REAPPLY_AFTER_DAYS);

        self.deliver(&shopkeeper.email, "Your Shop Registration Has Been Rejected", REJECTED_TEMPLATE, &ctx).await
    }

    async fn deliver(&self, recipient: &str, subject: &str, template: &str, ctx: &Context) -> Result<(), AppError> {
        let body = self.templates.render(template, ctx).map_err(|e| {
            AppError::InternalWithMsg(format!("Rendering {} failed: {}", template, e))
        })?;

        self.email.send(recipient, subject, &body).await?;
        info!(recipient = %recipient, template = %template, "Notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::principal::{GeoPoint, NewShopkeeperParams};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<(String, String, String)>>);

    #[async_trait]
    impl EmailService for Outbox {
        async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
            self.0.lock().unwrap().push((recipient.into(), subject.into(), html_body.into()));
            Ok(())
        }
    }

    fn shopkeeper() -> Shopkeeper {
        Shopkeeper::new(NewShopkeeperParams {
            name: "Ravi".into(),
            shop_name: "Cane & Co".into(),
            email: "ravi@x.com".into(),
            password_hash: "hash".into(),
            mobile_number: "9876543210".into(),
            license_number: "LIC-42".into(),
            location: GeoPoint::new(77.59, 12.97, "MG Road".into()).unwrap(),
        })
    }

    fn notifier(outbox: Arc<Outbox>) -> NotificationService {
        NotificationService::new(
            outbox,
            Arc::new(email_templates().unwrap()),
            MailLinks {
                public_base_url: "https://api.example.com".into(),
                login_url: "https://app.example.com/login".into(),
                support_email: "help@example.com".into(),
                support_url: "https://example.com/contact".into(),
            },
        )
    }

    #[tokio::test]
    async fn approval_request_links_to_the_approve_route() {
        let outbox = Arc::new(Outbox::default());
        let sk = shopkeeper();
        notifier(outbox.clone()).approval_request("admin@x.com", &sk).await.unwrap();

        let sent = outbox.0.lock().unwrap();
        let (to, subject, body) = &sent[0];
        assert_eq!(to, "admin@x.com");
        assert_eq!(subject, "New Shopkeeper Approval Request");
        assert!(body.contains(&format!("https://api.example.com/api/admin/approve-shopkeeper/{}", sk.id)));
        assert!(body.contains("LIC-42"));
        // autoescaped
        assert!(body.contains("Cane &amp; Co"));
    }

    #[tokio::test]
    async fn rejection_carries_reason_and_support_details() {
        let outbox = Arc::new(Outbox::default());
        notifier(outbox.clone()).rejected(&shopkeeper(), DEFAULT_REJECTION_REASON).await.unwrap();

        let sent = outbox.0.lock().unwrap();
        let (to, _, body) = &sent[0];
        assert_eq!(to, "ravi@x.com");
        assert!(body.contains(DEFAULT_REJECTION_REASON));
        assert!(body.contains("help@example.com"));
        assert!(body.contains("after 30 days"));
    }
}
