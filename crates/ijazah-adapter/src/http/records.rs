/*
[INPUT]:  Student, issuer-registration and certificate queries plus session credential
[OUTPUT]: Typed backend records
[POS]:    HTTP layer - record endpoints consumed by the views (carry the bearer token)
[UPDATE]: When adding record endpoints or changing query parameters
*/

use reqwest::Method;

use crate::http::{IjazahClient, Result};
use crate::types::{
    BlockchainCertificatesResponse, IssuerRegistration, IssuerRegistrationCreate,
    IssuerRegistrationList, IssuerRegistrationQuery, Student, StudentCreate, StudentVerify,
    StudentVerifyResponse, VerifyCertificateRequest, VerifyCertificateResponse,
};

// ### Students

impl IjazahClient {
    /// POST /students
    pub async fn create_student(&self, student: &StudentCreate) -> Result<Student> {
        let builder = self
            .request_with_credentials(Method::POST, &["students"])?
            .json(student);
        self.send_json(builder).await
    }

    /// GET /students/wallet/{wallet_address}
    pub async fn student_by_wallet(&self, wallet_address: &str) -> Result<Student> {
        let builder =
            self.request_with_credentials(Method::GET, &["students", "wallet", wallet_address])?;
        self.send_json(builder).await
    }

    /// GET /students/nim/{nim}
    pub async fn student_by_nim(&self, nim: &str) -> Result<Student> {
        let builder = self.request_with_credentials(Method::GET, &["students", "nim", nim])?;
        self.send_json(builder).await
    }

    /// POST /students/verify
    pub async fn verify_student(&self, query: &StudentVerify) -> Result<StudentVerifyResponse> {
        let builder = self
            .request_with_credentials(Method::POST, &["students", "verify"])?
            .json(query);
        self.send_json(builder).await
    }
}

// ### Issuer registrations

impl IjazahClient {
    /// POST /issuer-registrations
    pub async fn create_issuer_registration(
        &self,
        registration: &IssuerRegistrationCreate,
    ) -> Result<IssuerRegistration> {
        let builder = self
            .request_with_credentials(Method::POST, &["issuer-registrations"])?
            .json(registration);
        self.send_json(builder).await
    }

    /// GET /issuer-registrations/{id}
    pub async fn issuer_registration(&self, id: &str) -> Result<IssuerRegistration> {
        let builder = self.request_with_credentials(Method::GET, &["issuer-registrations", id])?;
        self.send_json(builder).await
    }

    /// GET /issuer-registrations?name=&status=&sort=&page=&page_size=
    pub async fn issuer_registrations(
        &self,
        query: &IssuerRegistrationQuery,
    ) -> Result<IssuerRegistrationList> {
        let builder = self
            .request_with_credentials(Method::GET, &["issuer-registrations"])?
            .query(query);
        self.send_json(builder).await
    }

    /// PATCH /issuer-registrations/{id}/accept
    pub async fn accept_issuer_registration(&self, id: &str) -> Result<IssuerRegistration> {
        let builder =
            self.request_with_credentials(Method::PATCH, &["issuer-registrations", id, "accept"])?;
        self.send_json(builder).await
    }

    /// PATCH /issuer-registrations/{id}/reject
    pub async fn reject_issuer_registration(&self, id: &str) -> Result<IssuerRegistration> {
        let builder =
            self.request_with_credentials(Method::PATCH, &["issuer-registrations", id, "reject"])?;
        self.send_json(builder).await
    }

    /// DELETE /issuer-registrations/{id}
    pub async fn delete_issuer_registration(&self, id: &str) -> Result<()> {
        let builder =
            self.request_with_credentials(Method::DELETE, &["issuer-registrations", id])?;
        self.send_empty(builder).await
    }
}

// ### Certificates

impl IjazahClient {
    /// POST /certificate/verify
    pub async fn verify_certificate(&self, student_id: &str) -> Result<VerifyCertificateResponse> {
        let body = VerifyCertificateRequest {
            student_id: student_id.to_string(),
        };
        let builder = self
            .request_with_credentials(Method::POST, &["certificate", "verify"])?
            .json(&body);
        self.send_json(builder).await
    }

    /// GET /certificates/blockchain/all
    pub async fn blockchain_certificates(&self) -> Result<BlockchainCertificatesResponse> {
        let builder = self.request_with_credentials(Method::GET, &["certificates", "blockchain", "all"])?;
        self.send_json(builder).await
    }
}
