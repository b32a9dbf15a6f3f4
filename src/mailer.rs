//! Best-effort transactional email for booking lifecycle events.
//!
//! Every send attempt returns a bool and logs its own failure; nothing here
//! escalates into an error the caller has to handle, because the business
//! transaction the email reports on has already committed.

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::MailConfig;
use crate::models::booking::Booking;

const HOTEL_NAME: &str = "Habeeb Empyrean Hotel & Resort";

#[derive(Clone)]
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn credentials(&self) -> Option<(String, String)> {
        let username = self.config.username.clone().filter(|u| !u.is_empty())?;
        let password = self.config.password.clone().filter(|p| !p.is_empty())?;
        Some((username, password))
    }

    fn transport(&self, username: String, password: String) -> Option<SmtpTransport> {
        let builder = if self.config.use_ssl {
            SmtpTransport::relay(&self.config.server)
        } else if self.config.use_tls {
            SmtpTransport::starttls_relay(&self.config.server)
        } else {
            Ok(SmtpTransport::builder_dangerous(&self.config.server))
        };
        match builder {
            Ok(builder) => Some(
                builder
                    .port(self.config.port)
                    .credentials(Credentials::new(username, password))
                    .build(),
            ),
            Err(e) => {
                log::error!("SMTP relay error for {}: {e}", self.config.server);
                None
            }
        }
    }

    fn sender(&self, username: &str) -> Option<Mailbox> {
        match format!("{} <{}>", self.config.sender_name, username).parse() {
            Ok(mailbox) => Some(mailbox),
            Err(e) => {
                log::error!("invalid sender address {username}: {e}");
                None
            }
        }
    }

    /// Staff distribution list: `HOTEL_NOTIFICATION_EMAIL` (comma-separated
    /// accepted), falling back to the transport username.
    fn staff_recipients(&self) -> Vec<Mailbox> {
        let raw = self
            .config
            .staff_addresses
            .clone()
            .filter(|r| !r.trim().is_empty())
            .or_else(|| self.config.username.clone());
        let Some(raw) = raw else {
            return Vec::new();
        };
        raw.split(',')
            .filter_map(|addr| {
                let addr = addr.trim();
                if addr.is_empty() {
                    return None;
                }
                match addr.parse::<Mailbox>() {
                    Ok(mailbox) => Some(mailbox),
                    Err(e) => {
                        log::warn!("skipping invalid staff address {addr}: {e}");
                        None
                    }
                }
            })
            .collect()
    }

    fn guest_recipient(&self, booking: &Booking) -> Vec<Mailbox> {
        match booking.email.parse::<Mailbox>() {
            Ok(mailbox) => vec![mailbox],
            Err(e) => {
                log::warn!("booking #{} has no usable email address: {e}", booking.id);
                Vec::new()
            }
        }
    }

    fn admin_link(&self, booking_id: i64) -> String {
        match &self.config.base_url {
            Some(base) => format!("{}/admin/booking/{}", base.trim_end_matches('/'), booking_id),
            None => format!("/admin/booking/{booking_id}"),
        }
    }

    fn deliver(
        &self,
        context: &str,
        recipients: Vec<Mailbox>,
        subject: String,
        plain: String,
        html: Option<String>,
    ) -> bool {
        let Some((username, password)) = self.credentials() else {
            log::warn!("{context}: mail credentials not set; skipping email send.");
            return false;
        };
        if recipients.is_empty() {
            log::warn!("{context}: no recipients configured; skipping email send.");
            return false;
        }
        let Some(from) = self.sender(&username) else {
            return false;
        };
        let Some(transport) = self.transport(username, password) else {
            return false;
        };

        let names: Vec<String> = recipients.iter().map(ToString::to_string).collect();
        let mut builder = Message::builder().from(from).subject(subject);
        for recipient in recipients {
            builder = builder.to(recipient);
        }
        let message = match html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(plain, html)),
            None => builder.header(ContentType::TEXT_PLAIN).body(plain),
        };
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                log::error!("{context}: could not build message: {e}");
                return false;
            }
        };

        match transport.send(&message) {
            Ok(_) => {
                log::info!("{context}: email sent to {}", names.join(", "));
                true
            }
            Err(e) => {
                log::error!("{context}: failed to send email: {e}");
                false
            }
        }
    }

    /// Acknowledgment to the guest right after submission; status is still
    /// pending at this point.
    pub fn booking_received(&self, booking: &Booking, suite: &str) -> bool {
        let subject = format!("Habeeb Empyrean — Booking Received (Ref #{})", booking.id);
        let body = format!(
            "Dear {},\n\n\
             Thank you for booking at {HOTEL_NAME}. Your booking request has been received and is awaiting hotel confirmation.\n\n\
             Booking reference: {}\n\
             Suite: {suite}\n\
             Check-in: {}\n\
             Check-out: {}\n\
             Guests: {}\n\n\
             We will notify you once the hotel confirms your booking.\n\n\
             Warm regards,\n\
             {HOTEL_NAME} Concierge\n",
            booking.full_name, booking.id, booking.checkin, booking.checkout, booking.guests
        );
        self.deliver(
            "booking_received",
            self.guest_recipient(booking),
            subject,
            body,
            None,
        )
    }

    /// Full booking details to the staff list after a new submission.
    pub fn new_booking_alert(&self, booking: &Booking, suite: &str) -> bool {
        let subject = format!("New Booking Request — Ref #{}", booking.id);
        let body = format!(
            "New booking received at {HOTEL_NAME}.\n\n{}\n\nAdmin page: {}\n",
            self.booking_summary(booking, suite),
            self.admin_link(booking.id)
        );
        self.deliver(
            "new_booking_alert",
            self.staff_recipients(),
            subject,
            body,
            None,
        )
    }

    /// Confirmation to the guest once staff confirm the booking.
    pub fn booking_confirmed(&self, booking: &Booking, suite: &str) -> bool {
        let subject = format!("Habeeb Empyrean — Booking Confirmed (Ref #{})", booking.id);
        let plain = format!(
            "Dear {},\n\n\
             Thank you for booking at {HOTEL_NAME} — your booking has been confirmed.\n\n\
             Booking reference: {}\n\
             Suite: {suite}\n\
             Check-in: {}\n\
             Check-out: {}\n\n\
             We look forward to hosting you. If you need anything before arrival, reply to this email or call our concierge.\n\n\
             Warm regards,\n\
             {HOTEL_NAME} Concierge\n",
            booking.full_name, booking.id, booking.checkin, booking.checkout
        );
        let html = format!(
            "<p>Dear {},</p>\
             <p>Thank you for booking at <strong>{HOTEL_NAME}</strong> — your booking has been <strong>confirmed</strong>.</p>\
             <ul>\
             <li><strong>Booking reference:</strong> {}</li>\
             <li><strong>Suite:</strong> {suite}</li>\
             <li><strong>Check-in:</strong> {}</li>\
             <li><strong>Check-out:</strong> {}</li>\
             </ul>\
             <p>We look forward to hosting you. If you need anything before arrival, reply to this email or call our concierge.</p>\
             <p>Warm regards,<br>{HOTEL_NAME} Concierge</p>",
            booking.full_name, booking.id, booking.checkin, booking.checkout
        );
        self.deliver(
            "booking_confirmed",
            self.guest_recipient(booking),
            subject,
            plain,
            Some(html),
        )
    }

    /// Confirmation alert to the staff list.
    pub fn confirmation_alert(&self, booking: &Booking, suite: &str) -> bool {
        let subject = format!("Booking Confirmed — Ref #{}", booking.id);
        let body = format!(
            "A booking has been confirmed at {HOTEL_NAME}.\n\n{}\n\nAdmin page: {}\n",
            self.booking_summary(booking, suite),
            self.admin_link(booking.id)
        );
        self.deliver(
            "confirmation_alert",
            self.staff_recipients(),
            subject,
            body,
            None,
        )
    }

    /// Cancellation notice to the guest, including reason and timestamp when
    /// they were recorded.
    pub fn booking_cancelled(&self, booking: &Booking, suite: &str) -> bool {
        let subject = format!("Habeeb Empyrean — Booking Cancelled (Ref #{})", booking.id);
        let mut lines = vec![
            format!("Dear {},", booking.full_name),
            String::new(),
            format!("We regret to inform you that your booking at {HOTEL_NAME} has been cancelled."),
            String::new(),
            format!("Booking reference: {}", booking.id),
            format!("Suite: {suite}"),
            format!("Check-in: {}", booking.checkin),
            format!("Check-out: {}", booking.checkout),
        ];
        if let Some(cancelled_at) = booking.cancelled_at {
            lines.push(format!("Cancelled at: {}", cancelled_at.format("%Y-%m-%d %H:%M:%S")));
        }
        if let Some(reason) = &booking.cancellation_reason {
            lines.push(String::new());
            lines.push("Reason for cancellation:".to_string());
            lines.push(reason.clone());
        }
        lines.extend([
            String::new(),
            "If you believe this is an error or would like help rebooking, please reply to this email or call our concierge.".to_string(),
            String::new(),
            "Warm regards,".to_string(),
            format!("{HOTEL_NAME} Concierge"),
        ]);
        self.deliver(
            "booking_cancelled",
            self.guest_recipient(booking),
            subject,
            lines.join("\n"),
            None,
        )
    }

    /// Cancellation alert to the staff list with the full booking context.
    pub fn cancellation_alert(&self, booking: &Booking, suite: &str) -> bool {
        let subject = format!("Booking Cancelled — Ref #{}", booking.id);
        let mut body = format!(
            "A booking has been cancelled at {HOTEL_NAME}.\n\n{}",
            self.booking_summary(booking, suite)
        );
        if let Some(cancelled_at) = booking.cancelled_at {
            body.push_str(&format!("\nCancelled at: {}", cancelled_at.format("%Y-%m-%d %H:%M:%S")));
        }
        if let Some(reason) = &booking.cancellation_reason {
            body.push_str(&format!("\n\nCancellation reason:\n{reason}"));
        }
        body.push_str(&format!("\n\nAdmin details: {}\n", self.admin_link(booking.id)));
        self.deliver(
            "cancellation_alert",
            self.staff_recipients(),
            subject,
            body,
            None,
        )
    }

    fn booking_summary(&self, booking: &Booking, suite: &str) -> String {
        format!(
            "Reference: {}\n\
             Name: {}\n\
             Email: {}\n\
             Phone: {}\n\
             Suite: {suite}\n\
             Check-in: {}\n\
             Check-out: {}\n\
             Guests: {}\n\
             Status: {}\n\
             Created at: {}",
            booking.id,
            booking.full_name,
            booking.email,
            booking.phone.as_deref().unwrap_or("N/A"),
            booking.checkin,
            booking.checkout,
            booking.guests,
            booking.status,
            booking.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
