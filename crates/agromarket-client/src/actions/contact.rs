//! Profile page contact form.

use std::cell::RefCell;

use serde::Serialize;

use crate::client::MarketplaceClient;
use crate::controller::{Mutation, MutationOutcome, Notices};
use crate::effects::{NotificationKind, UiEffects};
use crate::envelope::ServerState;
use crate::error::ActionError;
use crate::inflight::TargetKey;
use crate::request::Payload;
use crate::transport::Transport;
use crate::validate::{validate_field, FieldKind};

pub const SEND_MESSAGE_ENDPOINT: &str = "/users/send-message/";

const SUBMIT_LABEL: &str = "Send Message";
const SENDING_LABEL: &str = "Sending...";

/// One input of the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub required: bool,
    /// Inline error shown under the field, if any.
    pub error: Option<String>,
}

/// The contact modal and its form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    pub recipient_id: String,
    pub fields: Vec<FormField>,
    pub modal_open: bool,
    pub submit_enabled: bool,
    pub submit_label: String,
}

impl ContactForm {
    /// A closed form with the usual `subject` and `message` fields.
    pub fn new(recipient_id: impl Into<String>) -> Self {
        ContactForm {
            recipient_id: recipient_id.into(),
            fields: vec![
                FormField::required("subject"),
                FormField::required("message"),
            ],
            modal_open: false,
            submit_enabled: true,
            submit_label: SUBMIT_LABEL.to_string(),
        }
    }

    pub fn open(&mut self) {
        self.modal_open = true;
    }

    pub fn close(&mut self) {
        self.modal_open = false;
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(FormField {
                name: name.to_string(),
                value,
                required: false,
                error: None,
            }),
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Validates every field, recording inline errors. Returns the first error.
    pub fn validate(&mut self) -> Result<(), String> {
        let mut first = None;
        for field in &mut self.fields {
            let kind = FieldKind::from_field_name(&field.name);
            field.error = validate_field(kind, &field.value, field.required).err();
            if first.is_none() {
                first = field.error.clone();
            }
        }
        first.map_or(Ok(()), Err)
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
            field.error = None;
        }
    }

    fn payload(&self) -> Payload {
        Payload::multipart(
            std::iter::once(("recipient_id", self.recipient_id.as_str()))
                .chain(self.fields.iter().map(|f| (f.name.as_str(), f.value.as_str()))),
        )
    }
}

impl FormField {
    fn required(name: &str) -> Self {
        FormField {
            name: name.to_string(),
            value: String::new(),
            required: true,
            error: None,
        }
    }
}

impl<T: Transport, E: UiEffects> MarketplaceClient<T, E> {
    /// Submits the contact form.
    ///
    /// Invalid forms are not sent. While sending, the submit button is
    /// disabled; success closes the modal and clears the form, failure leaves
    /// the typed message in place.
    pub async fn send_message(
        &self,
        form: &RefCell<ContactForm>,
    ) -> Result<MutationOutcome<ServerState>, ActionError> {
        if let Err(message) = form.borrow_mut().validate() {
            self.effects()
                .show_notification("Please correct the errors in the form.", NotificationKind::Error);
            return Err(ActionError::Validation(message));
        }

        let (recipient_id, payload, previous_label) = {
            let form = form.borrow();
            (form.recipient_id.clone(), form.payload(), form.submit_label.clone())
        };

        let request = self.post(SEND_MESSAGE_ENDPOINT, payload);
        let mut mutation = Mutation::new(
            request,
            TargetKey::scoped("contact", &recipient_id),
            Notices::fixed("Message sent successfully!", "Failed to send message"),
        );

        let outcome = self
            .controller()
            .perform(
                &mut mutation,
                || {
                    let mut form = form.borrow_mut();
                    form.submit_enabled = false;
                    form.submit_label = SENDING_LABEL.to_string();
                },
                |_: &ServerState| {
                    let mut form = form.borrow_mut();
                    form.reset();
                    form.close();
                    form.submit_enabled = true;
                    form.submit_label = previous_label.clone();
                },
                |_reason| {
                    let mut form = form.borrow_mut();
                    form.submit_enabled = true;
                    form.submit_label = previous_label.clone();
                },
            )
            .await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_marks_missing_required_fields() {
        let mut form = ContactForm::new("7");
        form.set("subject", "Tomatoes");
        assert_eq!(form.validate(), Err("This field is required.".to_string()));
        assert!(form.fields[0].error.is_none());
        assert!(form.fields[1].error.is_some());
    }

    #[test]
    fn optional_email_checked_when_present() {
        let mut form = ContactForm::new("7");
        form.set("subject", "Hi");
        form.set("message", "Do you ship?");
        form.set("email", "nope");
        assert_eq!(form.validate(), Err("Please enter a valid email address.".to_string()));
        form.set("email", "buyer@agro.market");
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn payload_includes_recipient_and_fields() {
        let mut form = ContactForm::new("7");
        form.set("subject", "Hi");
        let payload = form.payload();
        assert_eq!(payload.field("recipient_id").as_deref(), Some("7"));
        assert_eq!(payload.field("subject").as_deref(), Some("Hi"));
        assert!(matches!(payload, Payload::Multipart(_)));
    }
}
