use std::collections::BTreeMap;

use chrono::Utc;
use common::types::apartment::{ApartmentStatsView, PriceRange, ProjectCounts};
use models::apartment::{self, ActiveModel, Column, Entity, StringList};
use models::errors::ModelError;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use tracing::debug;
use uuid::Uuid;

use crate::apartment::domain::{non_blank, ApartmentDraft, DUPLICATE_UNIT, ApartmentFilter, ApartmentQuery, OwnerQuery, SortField, SortOrder};
use crate::apartment::repository::{Apartment, ApartmentRepository};
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Columns matched by the general `search` filter.
const LISTING_SEARCH_COLUMNS: [Column; 6] =
    [Column::UnitName, Column::UnitNumber, Column::Project, Column::Description, Column::Address, Column::City];

/// Columns matched by the owner listing search.
const OWNER_SEARCH_COLUMNS: [Column; 5] = [Column::UnitName, Column::Project, Column::Description, Column::Address, Column::City];

/// Columns scored by free-text search.
const TEXT_SEARCH_COLUMNS: [Column; 3] = [Column::UnitName, Column::Project, Column::Description];

pub struct SeaOrmApartmentRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmApartmentRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `LOWER(col) LIKE '%needle%'`, with LIKE wildcards in `needle` taken literally.
fn contains(col: Column, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

fn contains_any(cols: &[Column], needle: &str) -> Condition {
    cols.iter().fold(Condition::any(), |cond, col| cond.add(contains(*col, needle)))
}

/// WHERE clause for the public listing filters.
pub fn filter_condition(f: &ApartmentFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(s) = non_blank(&f.search) {
        cond = cond.add(contains_any(&LISTING_SEARCH_COLUMNS, s));
    }
    let text_filters = [
        (Column::UnitName, &f.unit_name),
        (Column::UnitNumber, &f.unit_number),
        (Column::Project, &f.project),
        (Column::City, &f.city),
        (Column::State, &f.state),
    ];
    for (col, value) in text_filters {
        if let Some(v) = non_blank(value) {
            cond = cond.add(contains(col, v));
        }
    }
    if let Some(available) = f.is_available {
        cond = cond.add(Column::IsAvailable.eq(available));
    }
    if let Some(policy) = f.pet_policy {
        cond = cond.add(Column::PetPolicy.eq(policy.as_str()));
    }
    if let Some(beds) = f.bedrooms {
        cond = cond.add(Column::Bedrooms.gte(beds));
    }
    if let Some(baths) = f.bathrooms {
        cond = cond.add(Column::Bathrooms.gte(baths));
    }
    if let Some(min) = f.min_price {
        cond = cond.add(Column::Price.gte(min));
    }
    if let Some(max) = f.max_price {
        cond = cond.add(Column::Price.lte(max));
    }
    cond
}

fn listing_count() -> SimpleExpr {
    SimpleExpr::from(Func::count(Expr::col(Column::Id)))
}

fn sort_column(field: SortField) -> Column {
    match field {
        SortField::Price => Column::Price,
        SortField::Bedrooms => Column::Bedrooms,
        SortField::Bathrooms => Column::Bathrooms,
        SortField::SquareFootage => Column::SquareFootage,
        SortField::CreatedAt => Column::CreatedAt,
        SortField::UnitName => Column::UnitName,
    }
}

fn sorted(select: Select<Entity>, field: SortField, order: SortOrder) -> Select<Entity> {
    let order = match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    };
    // id keeps pages stable when the sort key ties
    select.order_by(sort_column(field), order).order_by_asc(Column::Id)
}

impl SeaOrmApartmentRepository {
    async fn fetch_page(&self, select: Select<Entity>, pagination: Pagination) -> Result<(Vec<Apartment>, u64), ServiceError> {
        let total = select.clone().count(&self.db).await?;
        let rows = select.offset(pagination.offset()).limit(pagination.limit).all(&self.db).await?;
        Ok((rows, total))
    }
}

fn write_draft(am: &mut ActiveModel, d: ApartmentDraft) {
    am.unit_name = Set(d.unit_name);
    am.unit_number = Set(d.unit_number);
    am.project = Set(d.project);
    am.description = Set(d.description);
    am.bedrooms = Set(d.bedrooms);
    am.bathrooms = Set(d.bathrooms);
    am.square_footage = Set(d.square_footage);
    am.price = Set(d.price);
    am.address = Set(d.address);
    am.city = Set(d.city);
    am.state = Set(d.state);
    am.zip_code = Set(d.zip_code);
    am.amenities = Set(StringList(d.amenities));
    am.images = Set(StringList(d.images));
    am.is_available = Set(d.is_available);
    am.floor_plan = Set(d.floor_plan);
    am.pet_policy = Set(d.pet_policy.as_str().to_string());
    am.parking_spaces = Set(d.parking_spaces);
    am.lease_terms = Set(StringList(d.lease_terms));
    am.contact_email = Set(d.contact_email);
    am.contact_phone = Set(d.contact_phone);
    am.virtual_tour_url = Set(d.virtual_tour_url);
    am.updated_at = Set(Utc::now().into());
}

fn write_error(err: sea_orm::DbErr) -> ServiceError {
    ServiceError::from(ModelError::from_db(err, DUPLICATE_UNIT))
}

#[async_trait::async_trait]
impl ApartmentRepository for SeaOrmApartmentRepository {
    async fn list(&self, query: &ApartmentQuery) -> Result<(Vec<Apartment>, u64), ServiceError> {
        let select = Entity::find().filter(filter_condition(&query.filter));
        self.fetch_page(sorted(select, query.sort_by, query.sort_order), query.pagination).await
    }

    async fn list_by_owner(&self, owner_id: Uuid, query: &OwnerQuery) -> Result<(Vec<Apartment>, u64), ServiceError> {
        let mut cond = Condition::all().add(Column::UserId.eq(owner_id));
        if let Some(s) = non_blank(&query.search) {
            cond = cond.add(contains_any(&OWNER_SEARCH_COLUMNS, s));
        }
        let select = Entity::find().filter(cond);
        self.fetch_page(sorted(select, query.sort_by, query.sort_order), query.pagination).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Apartment>, ServiceError> {
        Ok(Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_unit(&self, unit_number: &str, project: &str) -> Result<Option<Apartment>, ServiceError> {
        let found = Entity::find()
            .filter(Column::UnitNumber.eq(unit_number))
            .filter(Column::Project.eq(project))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    async fn insert(&self, owner_id: Uuid, draft: ApartmentDraft) -> Result<Apartment, ServiceError> {
        let now = Utc::now().into();
        let mut am = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(owner_id),
            created_at: Set(now),
            ..Default::default()
        };
        write_draft(&mut am, draft);
        am.insert(&self.db).await.map_err(write_error)
    }

    async fn update(&self, existing: Apartment, draft: ApartmentDraft) -> Result<Apartment, ServiceError> {
        let mut am: ActiveModel = existing.into();
        write_draft(&mut am, draft);
        am.update(&self.db).await.map_err(write_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn stats(&self) -> Result<ApartmentStatsView, ServiceError> {
        let total = Entity::find().count(&self.db).await?;
        let available = Entity::find().filter(Column::IsAvailable.eq(true)).count(&self.db).await?;
        let unavailable = Entity::find().filter(Column::IsAvailable.eq(false)).count(&self.db).await?;

        let (avg, min, max) = Entity::find()
            .select_only()
            .column_as(SimpleExpr::from(Func::avg(Expr::col(Column::Price))), "avg_price")
            .column_as(SimpleExpr::from(Func::min(Expr::col(Column::Price))), "min_price")
            .column_as(SimpleExpr::from(Func::max(Expr::col(Column::Price))), "max_price")
            .into_tuple::<(Option<f64>, Option<f64>, Option<f64>)>()
            .one(&self.db)
            .await?
            .unwrap_or((None, None, None));

        let bedroom_rows: Vec<(i32, i64)> = Entity::find()
            .select_only()
            .column(Column::Bedrooms)
            .column_as(listing_count(), "listings")
            .group_by(Column::Bedrooms)
            .order_by_asc(Column::Bedrooms)
            .into_tuple()
            .all(&self.db)
            .await?;

        let project_rows: Vec<(String, i64)> = Entity::find()
            .select_only()
            .column(Column::Project)
            .column_as(listing_count(), "listings")
            .group_by(Column::Project)
            .order_by_desc(listing_count())
            .order_by_asc(Column::Project)
            .into_tuple()
            .all(&self.db)
            .await?;
        debug!(total, groups = project_rows.len(), "apartment_stats");

        Ok(ApartmentStatsView {
            total,
            available,
            unavailable,
            average_price: avg.unwrap_or(0.0),
            price_range: PriceRange { min: min.unwrap_or(0.0), max: max.unwrap_or(0.0) },
            bedroom_distribution: bedroom_rows.into_iter().map(|(b, n)| (b, n.max(0) as u64)).collect::<BTreeMap<_, _>>(),
            project_counts: ProjectCounts(project_rows.into_iter().map(|(p, n)| (p, n.max(0) as u64)).collect()),
        })
    }

    async fn text_candidates(&self, terms: &[String], cap: u64) -> Result<Vec<Apartment>, ServiceError> {
        let cond = terms
            .iter()
            .fold(Condition::any(), |cond, term| cond.add(contains_any(&TEXT_SEARCH_COLUMNS, term)));
        let rows = apartment::Entity::find()
            .filter(cond)
            .order_by_desc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .limit(cap)
            .all(&self.db)
            .await?;
        debug!(terms = terms.len(), candidates = rows.len(), cap, "search candidates loaded");
        Ok(rows)
    }
}
