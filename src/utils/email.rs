use lettre::{
    message::{header::ContentType, Mailbox},
    Address, Message, SmtpTransport, Transport,
};
use tracing::warn;

use crate::utils::app_error::AppError;

pub fn send_html_message(
    smtp_client: &SmtpTransport,
    from: &Mailbox,
    subject: &str,
    msg: &str,
    to: Address,
) -> Result<(), AppError> {
    smtp_client
        .send(
            &Message::builder()
                .from(from.clone())
                .to(Mailbox {
                    name: None,
                    email: to,
                })
                .subject(subject)
                .header(ContentType::TEXT_HTML)
                .body(msg.to_string())
                .map_err(|e| {
                    warn!("Error building email : {e}");
                    AppError::internal_server_error()
                })?,
        )
        .map_err(|e| {
            warn!("Error while sending email : {e}");
            AppError::internal_server_error()
        })?;
    Ok(())
}
