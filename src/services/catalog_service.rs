//! Catalog service - car brands, models and colors.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Brand, Color, Model, NewColor, NewModel};
use crate::errors::{AppError, AppResult, OptionExt, Resource};
use crate::infra::UnitOfWork;

/// Reference data used to describe cars. Writes are admin only.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_brands(&self) -> AppResult<Vec<Brand>>;
    async fn get_brand(&self, id: i32) -> AppResult<Brand>;
    async fn create_brand(&self, name: String) -> AppResult<Brand>;
    async fn update_brand(&self, id: i32, name: String) -> AppResult<Brand>;
    async fn delete_brand(&self, id: i32) -> AppResult<()>;

    /// All models, or the models of one brand
    async fn list_models(&self, brand_id: Option<i32>) -> AppResult<Vec<Model>>;
    async fn get_model(&self, id: i32) -> AppResult<Model>;
    async fn create_model(&self, model: NewModel) -> AppResult<Model>;
    async fn update_model(&self, id: i32, model: NewModel) -> AppResult<Model>;
    async fn delete_model(&self, id: i32) -> AppResult<()>;

    async fn list_colors(&self) -> AppResult<Vec<Color>>;
    async fn get_color(&self, id: i32) -> AppResult<Color>;
    async fn create_color(&self, color: NewColor) -> AppResult<Color>;
    async fn update_color(&self, id: i32, color: NewColor) -> AppResult<Color>;
    async fn delete_color(&self, id: i32) -> AppResult<()>;
}

pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_brand_exists(&self, brand_id: i32) -> AppResult<()> {
        self.uow
            .brands()
            .find_by_id(brand_id)
            .await?
            .ok_or_not_found(Resource::Brand)
            .map(|_| ())
    }
}

/// A name is taken when another row than `current` already uses it
fn ensure_free(existing: Option<i32>, current: Option<i32>, resource: Resource) -> AppResult<()> {
    match existing {
        Some(id) if Some(id) != current => Err(AppError::AlreadyExists(resource)),
        _ => Ok(()),
    }
}

fn deleted(found: bool, resource: Resource) -> AppResult<()> {
    if found {
        Ok(())
    } else {
        Err(AppError::NotFound(resource))
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        Ok(self.uow.brands().find_all().await?)
    }

    async fn get_brand(&self, id: i32) -> AppResult<Brand> {
        self.uow
            .brands()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::Brand)
    }

    async fn create_brand(&self, name: String) -> AppResult<Brand> {
        let name = name.trim().to_string();
        let existing = self.uow.brands().find_by_name(&name).await?;
        ensure_free(existing.map(|b| b.id), None, Resource::Brand)?;

        Ok(self.uow.brands().create(name).await?)
    }

    async fn update_brand(&self, id: i32, name: String) -> AppResult<Brand> {
        let name = name.trim().to_string();
        let existing = self.uow.brands().find_by_name(&name).await?;
        ensure_free(existing.map(|b| b.id), Some(id), Resource::Brand)?;

        self.uow
            .brands()
            .update(id, name)
            .await?
            .ok_or_not_found(Resource::Brand)
    }

    async fn delete_brand(&self, id: i32) -> AppResult<()> {
        deleted(self.uow.brands().delete(id).await?, Resource::Brand)
    }

    async fn list_models(&self, brand_id: Option<i32>) -> AppResult<Vec<Model>> {
        let models = match brand_id {
            Some(brand_id) => self.uow.models().find_by_brand(brand_id).await?,
            None => self.uow.models().find_all().await?,
        };
        Ok(models)
    }

    async fn get_model(&self, id: i32) -> AppResult<Model> {
        self.uow
            .models()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::Model)
    }

    async fn create_model(&self, model: NewModel) -> AppResult<Model> {
        let model = NewModel {
            name: model.name.trim().to_string(),
            ..model
        };
        self.ensure_brand_exists(model.brand_id).await?;

        let existing = self
            .uow
            .models()
            .find_by_name_and_brand(&model.name, model.brand_id)
            .await?;
        ensure_free(existing.map(|m| m.id), None, Resource::Model)?;

        Ok(self.uow.models().create(model).await?)
    }

    async fn update_model(&self, id: i32, model: NewModel) -> AppResult<Model> {
        let model = NewModel {
            name: model.name.trim().to_string(),
            ..model
        };
        self.ensure_brand_exists(model.brand_id).await?;

        let existing = self
            .uow
            .models()
            .find_by_name_and_brand(&model.name, model.brand_id)
            .await?;
        ensure_free(existing.map(|m| m.id), Some(id), Resource::Model)?;

        self.uow
            .models()
            .update(id, model)
            .await?
            .ok_or_not_found(Resource::Model)
    }

    async fn delete_model(&self, id: i32) -> AppResult<()> {
        deleted(self.uow.models().delete(id).await?, Resource::Model)
    }

    async fn list_colors(&self) -> AppResult<Vec<Color>> {
        Ok(self.uow.colors().find_all().await?)
    }

    async fn get_color(&self, id: i32) -> AppResult<Color> {
        self.uow
            .colors()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::Color)
    }

    async fn create_color(&self, color: NewColor) -> AppResult<Color> {
        let color = NewColor {
            name: color.name.trim().to_string(),
            hex: color.hex.to_uppercase(),
        };
        let existing = self.uow.colors().find_by_name(&color.name).await?;
        ensure_free(existing.map(|c| c.id), None, Resource::Color)?;

        Ok(self.uow.colors().create(color).await?)
    }

    async fn update_color(&self, id: i32, color: NewColor) -> AppResult<Color> {
        let color = NewColor {
            name: color.name.trim().to_string(),
            hex: color.hex.to_uppercase(),
        };
        let existing = self.uow.colors().find_by_name(&color.name).await?;
        ensure_free(existing.map(|c| c.id), Some(id), Resource::Color)?;

        self.uow
            .colors()
            .update(id, color)
            .await?
            .ok_or_not_found(Resource::Color)
    }

    async fn delete_color(&self, id: i32) -> AppResult<()> {
        deleted(self.uow.colors().delete(id).await?, Resource::Color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DatabaseError;
    use crate::services::testing::MockRepos;
    use mockall::predicate::eq;
    use sea_orm::DbErr;

    fn brand(id: i32, name: &str) -> Brand {
        Brand {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_brand_trims_and_checks_name() {
        let mut repos = MockRepos::new();
        repos
            .brands
            .expect_find_by_name()
            .with(eq("Renault"))
            .returning(|_| Ok(None));
        repos
            .brands
            .expect_create()
            .withf(|name| name == "Renault")
            .returning(|name| Ok(brand(1, &name)));

        let service = CatalogManager::new(repos.into_uow());
        let created = service.create_brand("  Renault ".to_string()).await.unwrap();

        assert_eq!(created, brand(1, "Renault"));
    }

    #[tokio::test]
    async fn test_create_duplicate_brand() {
        let mut repos = MockRepos::new();
        repos
            .brands
            .expect_find_by_name()
            .returning(|name| Ok(Some(brand(3, name))));
        repos.brands.expect_create().never();

        let service = CatalogManager::new(repos.into_uow());
        let result = service.create_brand("Peugeot".to_string()).await;

        assert!(matches!(result, Err(AppError::AlreadyExists(Resource::Brand))));
    }

    #[tokio::test]
    async fn test_rename_brand_to_its_own_name() {
        let mut repos = MockRepos::new();
        repos
            .brands
            .expect_find_by_name()
            .returning(|name| Ok(Some(brand(3, name))));
        repos
            .brands
            .expect_update()
            .returning(|id, name| Ok(Some(brand(id, &name))));

        let service = CatalogManager::new(repos.into_uow());
        assert!(service.update_brand(3, "Peugeot".to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_referenced_brand_surfaces_database_error() {
        let mut repos = MockRepos::new();
        repos.brands.expect_delete().returning(|_| {
            Err(DatabaseError::new(
                "brand.delete",
                DbErr::Custom("foreign key violation".to_string()),
            ))
        });

        let service = CatalogManager::new(repos.into_uow());
        let result = service.delete_brand(1).await;

        assert!(matches!(result, Err(AppError::Database(e)) if e.operation == "brand.delete"));
    }

    #[tokio::test]
    async fn test_create_model_requires_brand() {
        let mut repos = MockRepos::new();
        repos.brands.expect_find_by_id().returning(|_| Ok(None));
        repos.models.expect_create().never();

        let service = CatalogManager::new(repos.into_uow());
        let result = service
            .create_model(NewModel {
                name: "Clio".to_string(),
                brand_id: 8,
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(Resource::Brand))));
    }

    #[tokio::test]
    async fn test_list_models_by_brand() {
        let mut repos = MockRepos::new();
        repos
            .models
            .expect_find_by_brand()
            .with(eq(2))
            .returning(|brand_id| {
                Ok(vec![Model {
                    id: 1,
                    name: "208".to_string(),
                    brand_id,
                }])
            });
        repos.models.expect_find_all().never();

        let service = CatalogManager::new(repos.into_uow());
        let models = service.list_models(Some(2)).await.unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].brand_id, 2);
    }

    #[tokio::test]
    async fn test_create_color_normalizes_hex() {
        let mut repos = MockRepos::new();
        repos.colors.expect_find_by_name().returning(|_| Ok(None));
        repos.colors.expect_create().returning(|color| {
            Ok(Color {
                id: 1,
                name: color.name,
                hex: color.hex,
            })
        });

        let service = CatalogManager::new(repos.into_uow());
        let color = service
            .create_color(NewColor {
                name: "Red".to_string(),
                hex: "#ff0000".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(color.hex, "#FF0000");
    }
}
