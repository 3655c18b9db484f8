use lettre::{
    message::Mailbox,
    transport::smtp::{
        authentication::Credentials, response::Response as LettreResponse, Error as LettreError,
    },
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(relay: &str, username: &str, password: &str) -> anyhow::Result<Self> {
        let address = username.parse::<Address>()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(relay)?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(Some("Club Admin".to_string()), address),
        })
    }

    /// Plain SMTP without credentials.
    #[cfg(test)]
    pub(crate) fn unencrypted(host: &str, port: u16, from: &str) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(Some("Club Admin".to_string()), from.parse::<Address>()?),
        })
    }

    pub async fn sanity_check(&self) -> Result<bool, LettreError> {
        self.transport.test_connection().await
    }

    pub async fn send(
        &self,
        to: Address,
        subject: &str,
        body: String,
    ) -> anyhow::Result<LettreResponse> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(None, to))
            .subject(subject)
            .body(body)?;

        Ok(self.transport.send(email).await?)
    }
}
