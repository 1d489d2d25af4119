use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};

use crate::domain::models::{IdKind, NewProduct, Product, ProductId};
use crate::domain::ports::{ProductRepository, RepositoryError};

const BACKEND: &str = "mongodb";
const COLLECTION: &str = "products";

#[derive(Debug, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    stock: i64,
}

impl TryFrom<ProductDocument> for Product {
    type Error = RepositoryError;

    fn try_from(document: ProductDocument) -> Result<Self, Self::Error> {
        let stock = u32::try_from(document.stock).map_err(|_| {
            RepositoryError::Storage(format!(
                "stock {} out of range for product {}",
                document.stock, document.id
            ))
        })?;

        Ok(Product {
            id: ProductId::Object(document.id),
            name: document.name,
            stock,
        })
    }
}

pub struct MongoProductRepository {
    client: Client,
    db: Database,
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(client: Client, db: Database) -> Self {
        let collection = db.collection(COLLECTION);
        Self {
            client,
            db,
            collection,
        }
    }

    fn object_id(id: &ProductId) -> Result<ObjectId, RepositoryError> {
        id.as_object().ok_or(RepositoryError::InvalidIdType(BACKEND))
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let document = ProductDocument {
            id: ObjectId::new(),
            name: product.name.clone(),
            stock: i64::from(product.stock),
        };

        self.collection.insert_one(&document).await?;

        Ok(product.into_product(ProductId::Object(document.id)))
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let id = Self::object_id(&product.id)?;

        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "name": product.name.as_str(), "stock": i64::from(product.stock) } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let id = Self::object_id(id)?;

        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(RepositoryError::NotFound)?
            .try_into()
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let documents: Vec<ProductDocument> =
            self.collection.find(doc! {}).await?.try_collect().await?;

        documents.into_iter().map(Product::try_from).collect()
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let id = Self::object_id(id)?;

        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn id_kind(&self) -> IdKind {
        IdKind::Object
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
