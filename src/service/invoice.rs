//! Invoice business logic
//!
//! Party and product references are checked against the database before
//! any write, and all reference problems are reported together with the
//! shape-level validation errors.

use crate::domain::{
    CreateInvoiceInput, Invoice, InvoiceChanges, InvoiceDetail, InvoiceItemInput, InvoiceStatus,
    NewInvoice, NewInvoiceItem, Role, StringUuid, UpdateInvoiceInput, UpdateStatusInput,
};
use crate::error::{AppError, FieldErrors, Result};
use crate::notify::LifecycleNotifier;
use crate::repository::{InvoiceRepository, ProductRepository, UserRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use validator::Validate;

pub struct InvoiceService<I, U, P>
where
    I: InvoiceRepository,
    U: UserRepository,
    P: ProductRepository,
{
    repo: Arc<I>,
    users: Arc<U>,
    products: Arc<P>,
    notifier: Option<Arc<dyn LifecycleNotifier>>,
}

impl<I, U, P> InvoiceService<I, U, P>
where
    I: InvoiceRepository,
    U: UserRepository,
    P: ProductRepository,
{
    pub fn new(
        repo: Arc<I>,
        users: Arc<U>,
        products: Arc<P>,
        notifier: Option<Arc<dyn LifecycleNotifier>>,
    ) -> Self {
        Self {
            repo,
            users,
            products,
            notifier,
        }
    }

    /// Resolve a party reference, recording an error when it does not
    /// point at an existing user with the expected role. A missing row
    /// and a role mismatch produce the same message.
    async fn resolve_user(
        &self,
        field: &str,
        raw: &str,
        role: Role,
        errors: &mut FieldErrors,
    ) -> Result<Option<StringUuid>> {
        let message = format!("The selected {} is invalid.", field.replace('_', " "));

        let Ok(id) = StringUuid::parse_str(raw) else {
            errors.add(field, message);
            return Ok(None);
        };

        match self.users.find_by_id(id).await? {
            Some(user) if user.role == role => Ok(Some(id)),
            _ => {
                errors.add(field, message);
                Ok(None)
            }
        }
    }

    fn resolve_status(token: Option<&str>, errors: &mut FieldErrors) -> Option<InvoiceStatus> {
        match token {
            Some(token) => match InvoiceStatus::parse(token) {
                Some(status) => Some(status),
                None => {
                    errors.add("status", "The selected status is invalid.");
                    None
                }
            },
            None => None,
        }
    }

    async fn resolve_items(
        &self,
        items: &[InvoiceItemInput],
        errors: &mut FieldErrors,
    ) -> Result<Vec<NewInvoiceItem>> {
        let mut resolved = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let field = format!("items.{}.product_id", index);

            let Ok(product_id) = StringUuid::parse_str(&item.product_id) else {
                errors.add(field, "The selected product id is invalid.");
                continue;
            };

            if self.products.find_by_id(product_id).await?.is_none() {
                errors.add(field, "The selected product id is invalid.");
                continue;
            }

            resolved.push(NewInvoiceItem {
                product_id,
                quantity: Decimal::from(item.quantity),
                total_price: item.total_price,
            });
        }

        Ok(resolved)
    }

    pub async fn create(&self, input: CreateInvoiceInput) -> Result<InvoiceDetail> {
        let mut errors: FieldErrors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let seller_id = self
            .resolve_user("seller_id", &input.seller_id, Role::Seller, &mut errors)
            .await?;
        let client_id = self
            .resolve_user("client_id", &input.client_id, Role::Client, &mut errors)
            .await?;
        let status =
            Self::resolve_status(input.status.as_deref(), &mut errors).unwrap_or(InvoiceStatus::Draft);
        let items = self.resolve_items(&input.items, &mut errors).await?;

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let new_invoice = NewInvoice {
            seller_id: seller_id.ok_or_else(|| anyhow::anyhow!("seller missing after validation"))?,
            client_id: client_id.ok_or_else(|| anyhow::anyhow!("client missing after validation"))?,
            status,
        };

        let invoice = self.repo.create(&new_invoice).await?;
        self.repo.insert_items(invoice.id, &items).await?;

        if let Some(notifier) = &self.notifier {
            notifier.invoice_created(&invoice);
        }

        self.repo
            .find_detailed(invoice.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to load created invoice")))
    }

    pub async fn get(&self, id: StringUuid) -> Result<InvoiceDetail> {
        self.repo
            .find_detailed(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))
    }

    /// Plain listing without relations
    pub async fn list(&self) -> Result<Vec<Invoice>> {
        self.repo.list().await
    }

    pub async fn list_by_status(&self, token: &str) -> Result<Vec<InvoiceDetail>> {
        let status = InvoiceStatus::parse(token)
            .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;
        self.repo.list_by_status(status).await
    }

    pub async fn list_by_seller(&self, seller_id: StringUuid) -> Result<Vec<InvoiceDetail>> {
        self.require_party(seller_id, Role::Seller).await?;
        self.repo.list_by_seller(seller_id).await
    }

    pub async fn list_by_client(&self, client_id: StringUuid) -> Result<Vec<InvoiceDetail>> {
        self.require_party(client_id, Role::Client).await?;
        self.repo.list_by_client(client_id).await
    }

    /// 404 unless the user exists and has the expected role
    async fn require_party(&self, id: StringUuid, role: Role) -> Result<()> {
        match self.users.find_by_id(id).await? {
            Some(user) if user.role == role => Ok(()),
            _ => {
                let party = match role {
                    Role::Seller => "Seller",
                    Role::Client => "Client",
                    Role::Admin => "User",
                };
                Err(AppError::NotFound(format!("{} not found", party)))
            }
        }
    }

    /// Update header fields; supplying `items` replaces the whole set
    pub async fn update(&self, id: StringUuid, input: UpdateInvoiceInput) -> Result<InvoiceDetail> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Invoice not found".to_string()));
        }

        let mut errors: FieldErrors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let seller_id = match &input.seller_id {
            Some(raw) => {
                self.resolve_user("seller_id", raw, Role::Seller, &mut errors)
                    .await?
            }
            None => None,
        };
        let client_id = match &input.client_id {
            Some(raw) => {
                self.resolve_user("client_id", raw, Role::Client, &mut errors)
                    .await?
            }
            None => None,
        };
        let status = Self::resolve_status(input.status.as_deref(), &mut errors);

        let items = match &input.items {
            Some(items) => Some(self.resolve_items(items, &mut errors).await?),
            None => None,
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let invoice = self
            .repo
            .update(
                id,
                &InvoiceChanges {
                    seller_id,
                    client_id,
                    status,
                },
            )
            .await?;

        if let Some(items) = items {
            self.repo.delete_items(id).await?;
            self.repo.insert_items(id, &items).await?;
        }

        if let Some(notifier) = &self.notifier {
            notifier.invoice_updated(&invoice);
        }

        self.repo
            .find_detailed(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))
    }

    /// The invoice is looked up before the token is parsed, so an
    /// unknown id is a 404 even when the status is also bad.
    pub async fn set_status(&self, id: StringUuid, input: UpdateStatusInput) -> Result<InvoiceDetail> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Invoice not found".to_string()));
        }

        let status = InvoiceStatus::parse(&input.status).ok_or_else(|| {
            AppError::Validation(FieldErrors::single(
                "status",
                "The selected status is invalid.",
            ))
        })?;

        let invoice = self
            .repo
            .update(
                id,
                &InvoiceChanges {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;

        if let Some(notifier) = &self.notifier {
            notifier.invoice_updated(&invoice);
        }

        self.repo
            .find_detailed(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))
    }

    /// Delete an invoice; line items go with it
    pub async fn delete(&self, id: StringUuid) -> Result<()> {
        let Some(invoice) = self.repo.find_by_id(id).await? else {
            return Err(AppError::NotFound("Invoice not found".to_string()));
        };

        self.repo.delete(id).await?;

        if let Some(notifier) = &self.notifier {
            notifier.invoice_deleted(&invoice);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Product, Role, User};
    use crate::repository::{MockInvoiceRepository, MockProductRepository, MockUserRepository};
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn sample_user(id: StringUuid, role: Role) -> User {
        User {
            id,
            name: "Someone".to_string(),
            email: format!("{}@example.com", id),
            password_hash: "hash".to_string(),
            phone: None,
            address: None,
            role,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_product(id: StringUuid) -> Product {
        Product {
            id,
            name: "Widget".to_string(),
            description: None,
            unit_price: dec!(19.99),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_invoice(id: StringUuid, status: InvoiceStatus) -> Invoice {
        Invoice {
            id,
            seller_id: Some(StringUuid::new_v4()),
            client_id: Some(StringUuid::new_v4()),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn detail_for(invoice: Invoice) -> InvoiceDetail {
        InvoiceDetail {
            invoice,
            seller: None,
            client: None,
            items: vec![],
        }
    }

    fn service(
        repo: MockInvoiceRepository,
        users: MockUserRepository,
        products: MockProductRepository,
    ) -> InvoiceService<MockInvoiceRepository, MockUserRepository, MockProductRepository> {
        InvoiceService::new(Arc::new(repo), Arc::new(users), Arc::new(products), None)
    }

    #[tokio::test]
    async fn test_create_with_valid_references() {
        let seller = StringUuid::new_v4();
        let client = StringUuid::new_v4();
        let product = StringUuid::new_v4();
        let invoice_id = StringUuid::new_v4();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(seller))
            .returning(move |id| Ok(Some(sample_user(id, Role::Seller))));
        users
            .expect_find_by_id()
            .with(eq(client))
            .returning(move |id| Ok(Some(sample_user(id, Role::Client))));

        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .with(eq(product))
            .returning(move |id| Ok(Some(sample_product(id))));

        let mut repo = MockInvoiceRepository::new();
        repo.expect_create()
            .withf(move |input| {
                input.seller_id == seller
                    && input.client_id == client
                    && input.status == InvoiceStatus::Draft
            })
            .returning(move |input| {
                Ok(Invoice {
                    id: invoice_id,
                    seller_id: Some(input.seller_id),
                    client_id: Some(input.client_id),
                    status: input.status,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });
        repo.expect_insert_items()
            .withf(move |id, items| {
                *id == invoice_id && items.len() == 1 && items[0].quantity == dec!(2)
            })
            .returning(|_, _| Ok(()));
        repo.expect_find_detailed().returning(move |id| {
            Ok(Some(detail_for(sample_invoice(id, InvoiceStatus::Draft))))
        });

        let service = service(repo, users, products);
        let input = CreateInvoiceInput {
            seller_id: seller.to_string(),
            client_id: client.to_string(),
            status: None,
            items: vec![InvoiceItemInput {
                product_id: product.to_string(),
                quantity: 2,
                total_price: dec!(39.98),
            }],
        };

        let detail = service.create(input).await.unwrap();
        assert_eq!(detail.invoice.status, InvoiceStatus::Draft);
    }

    #[tokio::test]
    async fn test_create_reports_all_reference_errors() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let mut products = MockProductRepository::new();
        products.expect_find_by_id().returning(|_| Ok(None));
        let repo = MockInvoiceRepository::new();

        let service = service(repo, users, products);
        let input = CreateInvoiceInput {
            seller_id: StringUuid::new_v4().to_string(),
            client_id: "not-a-uuid".to_string(),
            status: Some("cancelled".to_string()),
            items: vec![InvoiceItemInput {
                product_id: StringUuid::new_v4().to_string(),
                quantity: 1,
                total_price: dec!(1),
            }],
        };

        let err = service.create(input).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(
                    errors.0["seller_id"],
                    vec!["The selected seller id is invalid."]
                );
                assert_eq!(
                    errors.0["client_id"],
                    vec!["The selected client id is invalid."]
                );
                assert_eq!(errors.0["status"], vec!["The selected status is invalid."]);
                assert_eq!(
                    errors.0["items.0.product_id"],
                    vec!["The selected product id is invalid."]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_requires_at_least_one_item() {
        let seller = StringUuid::new_v4();
        let client = StringUuid::new_v4();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |id| Ok(Some(sample_user(id, Role::Seller))));
        let products = MockProductRepository::new();
        let repo = MockInvoiceRepository::new();

        let service = service(repo, users, products);
        let input = CreateInvoiceInput {
            seller_id: seller.to_string(),
            client_id: client.to_string(),
            status: None,
            items: vec![],
        };

        let err = service.create(input).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.0.contains_key("items"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_by_status_rejects_unknown_token() {
        let service = service(
            MockInvoiceRepository::new(),
            MockUserRepository::new(),
            MockProductRepository::new(),
        );

        let err = service.list_by_status("cancelled").await.unwrap_err();
        match err {
            AppError::BadRequest(message) => assert_eq!(message, "Invalid status"),
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_by_status_valid_token() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_list_by_status()
            .with(eq(InvoiceStatus::Paid))
            .returning(|_| Ok(vec![]));

        let service = service(repo, MockUserRepository::new(), MockProductRepository::new());
        assert!(service.list_by_status("paid").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_seller_unknown_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let service = service(
            MockInvoiceRepository::new(),
            users,
            MockProductRepository::new(),
        );

        let err = service
            .list_by_seller(StringUuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_seller_rejects_role_mismatch() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |id| Ok(Some(sample_user(id, Role::Client))));

        let service = service(
            MockInvoiceRepository::new(),
            users,
            MockProductRepository::new(),
        );

        let err = service
            .list_by_seller(StringUuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_party_role_mismatch() {
        let seller = StringUuid::new_v4();
        let client = StringUuid::new_v4();
        let product = StringUuid::new_v4();

        // Both parties exist but with swapped roles
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(seller))
            .returning(move |id| Ok(Some(sample_user(id, Role::Client))));
        users
            .expect_find_by_id()
            .with(eq(client))
            .returning(move |id| Ok(Some(sample_user(id, Role::Seller))));

        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(move |id| Ok(Some(sample_product(id))));

        let service = service(MockInvoiceRepository::new(), users, products);
        let input = CreateInvoiceInput {
            seller_id: seller.to_string(),
            client_id: client.to_string(),
            status: None,
            items: vec![InvoiceItemInput {
                product_id: product.to_string(),
                quantity: 1,
                total_price: dec!(1),
            }],
        };

        let err = service.create(input).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(
                    errors.0["seller_id"],
                    vec!["The selected seller id is invalid."]
                );
                assert_eq!(
                    errors.0["client_id"],
                    vec!["The selected client id is invalid."]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_replaces_items_when_given() {
        let invoice_id = StringUuid::new_v4();
        let product = StringUuid::new_v4();

        let users = MockUserRepository::new();
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(move |id| Ok(Some(sample_product(id))));

        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(sample_invoice(id, InvoiceStatus::Draft))));
        repo.expect_update()
            .returning(move |id, _| Ok(sample_invoice(id, InvoiceStatus::Draft)));
        repo.expect_delete_items()
            .with(eq(invoice_id))
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_insert_items()
            .withf(|_, items| items.len() == 1)
            .times(1)
            .returning(|_, _| Ok(()));
        repo.expect_find_detailed().returning(move |id| {
            Ok(Some(detail_for(sample_invoice(id, InvoiceStatus::Draft))))
        });

        let service = service(repo, users, products);
        let input = UpdateInvoiceInput {
            items: Some(vec![InvoiceItemInput {
                product_id: product.to_string(),
                quantity: 3,
                total_price: dec!(59.97),
            }]),
            ..Default::default()
        };

        assert!(service.update(invoice_id, input).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_without_items_keeps_existing() {
        let invoice_id = StringUuid::new_v4();

        let users = MockUserRepository::new();
        let products = MockProductRepository::new();

        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(sample_invoice(id, InvoiceStatus::Draft))));
        repo.expect_update()
            .withf(|_, changes| changes.status == Some(InvoiceStatus::Sent))
            .returning(move |id, _| Ok(sample_invoice(id, InvoiceStatus::Sent)));
        repo.expect_delete_items().times(0);
        repo.expect_insert_items().times(0);
        repo.expect_find_detailed()
            .returning(move |id| Ok(Some(detail_for(sample_invoice(id, InvoiceStatus::Sent)))));

        let service = service(repo, users, products);
        let input = UpdateInvoiceInput {
            status: Some("sent".to_string()),
            ..Default::default()
        };

        let detail = service.update(invoice_id, input).await.unwrap();
        assert_eq!(detail.invoice.status, InvoiceStatus::Sent);
    }

    #[tokio::test]
    async fn test_set_status_invalid_token() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(sample_invoice(id, InvoiceStatus::Draft))));

        let service = service(repo, MockUserRepository::new(), MockProductRepository::new());
        let err = service
            .set_status(
                StringUuid::new_v4(),
                UpdateStatusInput {
                    status: "archived".to_string(),
                },
            )
            .await
            .unwrap_err();

        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.0["status"], vec!["The selected status is invalid."]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_set_status_missing_invoice_wins_over_bad_token() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = service(repo, MockUserRepository::new(), MockProductRepository::new());
        let err = service
            .set_status(
                StringUuid::new_v4(),
                UpdateStatusInput {
                    status: "archived".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_status_valid() {
        let invoice_id = StringUuid::new_v4();
        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(sample_invoice(id, InvoiceStatus::Sent))));
        repo.expect_update()
            .withf(|_, changes| {
                changes.status == Some(InvoiceStatus::Paid)
                    && changes.seller_id.is_none()
                    && changes.client_id.is_none()
            })
            .returning(move |id, _| Ok(sample_invoice(id, InvoiceStatus::Paid)));

        repo.expect_find_detailed()
            .returning(move |id| Ok(Some(detail_for(sample_invoice(id, InvoiceStatus::Paid)))));

        let service = service(repo, MockUserRepository::new(), MockProductRepository::new());
        let detail = service
            .set_status(
                invoice_id,
                UpdateStatusInput {
                    status: "paid".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(detail.invoice.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_delete_missing_invoice() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = service(repo, MockUserRepository::new(), MockProductRepository::new());
        let err = service.delete(StringUuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
