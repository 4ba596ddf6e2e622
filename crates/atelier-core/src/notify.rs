//! Order notifications
//!
//! Checkout hands every placed order to a [`Notifier`]. The default
//! [`LogNotifier`] only logs the message; with the `smtp` feature the
//! [`SmtpNotifier`] mails it to the shop owner.

use async_trait::async_trait;
use std::fmt::Write as _;
use tracing::info;

use crate::Result;
use crate::db::Order;

pub const ORDER_SUBJECT: &str = "New Order Received";

/// Subject and plain-text body describing one order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMessage {
    pub subject: String,
    pub body: String,
}

/// Render the notification for `order`
pub fn compose_order_message(order: &Order) -> OrderMessage {
    let mut body = String::from("You have received a new order:\n\n");
    let _ = writeln!(body, "Buyer Email: {}", order.buyer_email);
    let _ = writeln!(body, "Order ID: {}", order.order_id);
    body.push_str("Order Details:\n");

    for row in &order.rows {
        let _ = writeln!(
            body,
            "- {}, Type: {}, Quantity: {}, Price per unit: {:.2}",
            row.title, row.typ, row.quantity, row.price
        );
    }
    let _ = writeln!(body, "\nTotal: {:.2}", order.total_price);

    OrderMessage {
        subject: ORDER_SUBJECT.to_string(),
        body,
    }
}

/// Delivers order notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_order(&self, order: &Order) -> Result<()>;
}

/// Writes the notification to the log instead of sending it
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_order(&self, order: &Order) -> Result<()> {
        let message = compose_order_message(order);
        info!(
            order_id = %order.order_id,
            subject = %message.subject,
            "Order notification:\n{}",
            message.body
        );
        Ok(())
    }
}

#[cfg(feature = "smtp")]
pub use smtp::SmtpNotifier;

#[cfg(feature = "smtp")]
mod smtp {
    use async_trait::async_trait;
    use lettre::message::Mailbox;
    use lettre::message::header::ContentType;
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
    use tracing::info;

    use super::{Notifier, compose_order_message};
    use crate::config::EmailConfig;
    use crate::db::Order;
    use crate::{Error, Result};

    /// Sends order notifications through an SMTP relay with STARTTLS
    #[derive(Debug, Clone)]
    pub struct SmtpNotifier {
        config: EmailConfig,
    }

    impl SmtpNotifier {
        pub fn new(config: EmailConfig) -> Self {
            Self { config }
        }

        fn credentials(&self) -> Result<(&str, &str, &str)> {
            match (&self.config.sender, &self.config.recipient, &self.config.password) {
                (Some(sender), Some(recipient), Some(password))
                    if !sender.is_empty() && !recipient.is_empty() && !password.is_empty() =>
                {
                    Ok((sender.as_str(), recipient.as_str(), password.as_str()))
                }
                _ => Err(Error::Config("email configuration is missing".to_string())),
            }
        }
    }

    #[async_trait]
    impl Notifier for SmtpNotifier {
        async fn send_order(&self, order: &Order) -> Result<()> {
            let (sender, recipient, password) = self.credentials()?;
            let message = compose_order_message(order);

            let from: Mailbox = sender
                .parse()
                .map_err(|e| Error::Config(format!("invalid sender address: {}", e)))?;
            let to: Mailbox = recipient
                .parse()
                .map_err(|e| Error::Config(format!("invalid recipient address: {}", e)))?;

            let email = Message::builder()
                .from(from)
                .to(to)
                .subject(message.subject)
                .header(ContentType::TEXT_PLAIN)
                .body(message.body)
                .map_err(|e| Error::Notify(e.to_string()))?;

            let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| Error::Notify(e.to_string()))?
                .port(self.config.smtp_port)
                .credentials(Credentials::new(sender.to_string(), password.to_string()))
                .build();

            mailer
                .send(email)
                .await
                .map_err(|e| Error::Notify(e.to_string()))?;

            info!("Order notification for {} sent to {}", order.order_id, recipient);
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_incomplete_config_is_rejected() {
            let notifier = SmtpNotifier::new(EmailConfig::default());
            assert!(matches!(notifier.credentials(), Err(Error::Config(_))));
        }
    }
}
