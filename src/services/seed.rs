//! Demo data for a fresh relational store.
//!
//! Re-running is safe: users, branches, goods and assignments that already
//! exist (by username, name or task) are left alone.

use anyhow::{Context, Result};
use sea_orm::DatabaseTransaction;
use std::collections::{HashMap, HashSet};
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::repositories::{
    activity::ActivityRepository, assignment::AssignmentRepository, branch::BranchRepository,
    goods::GoodsRepository,
    user::{UserRepository, hash_password},
};
use crate::models::{
    ActivityRecord, AssignmentRecord, AssignmentStatus, BranchRecord, GoodsRecord, Priority,
    Role, UserRecord, UserRef,
};
use crate::sync::datetime;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub branches: usize,
    pub goods: usize,
    pub assignments: usize,
    pub activities: usize,
}

struct DemoUser {
    username: &'static str,
    password: &'static str,
    role: Role,
    first_name: &'static str,
    last_name: &'static str,
    phone: &'static str,
    address: &'static str,
}

const USERS: [DemoUser; 3] = [
    DemoUser {
        username: "admin",
        password: "admin123",
        role: Role::Admin,
        first_name: "Admin",
        last_name: "User",
        phone: "+1234567890",
        address: "123 Admin Street, Admin City",
    },
    DemoUser {
        username: "employee1",
        password: "emp123",
        role: Role::Employee,
        first_name: "John",
        last_name: "Employee",
        phone: "+1234567891",
        address: "456 Employee Street, Employee City",
    },
    DemoUser {
        username: "customer1",
        password: "cust123",
        role: Role::Customer,
        first_name: "Jane",
        last_name: "Customer",
        phone: "+1234567892",
        address: "789 Customer Street, Customer City",
    },
];

/// (name, location, description, image, capacity, available)
const BRANCHES: [(&str, &str, &str, &str, i32, i32); 3] = [
    (
        "New York Branch",
        "New York, NY",
        "Main warehouse facility in New York",
        "https://images.unsplash.com/photo-1586953208448-b95a79798f07?w=500",
        1000,
        750,
    ),
    (
        "Los Angeles Branch",
        "Los Angeles, CA",
        "West coast distribution center",
        "https://images.unsplash.com/photo-1590725175835-bd11c9cd7a6b?w=500",
        1200,
        900,
    ),
    (
        "Chicago Branch",
        "Chicago, IL",
        "Midwest logistics hub",
        "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=500",
        800,
        600,
    ),
];

/// (name, description, category, quantity, price, branch)
const GOODS: [(&str, &str, &str, i32, f64, &str); 4] = [
    (
        "MacBook Pro",
        "High-performance laptop for professionals",
        "Electronics",
        50,
        1999.99,
        "New York Branch",
    ),
    (
        "iPhone 15",
        "Latest smartphone with advanced features",
        "Electronics",
        100,
        999.99,
        "New York Branch",
    ),
    (
        "Office Chair",
        "Ergonomic office chair for comfort",
        "Furniture",
        25,
        299.99,
        "Los Angeles Branch",
    ),
    (
        "Standing Desk",
        "Adjustable height standing desk",
        "Furniture",
        15,
        499.99,
        "Los Angeles Branch",
    ),
];

/// (task, description, priority, branch)
const ASSIGNMENTS: [(&str, &str, Priority, &str); 2] = [
    (
        "Inventory Check",
        "Perform weekly inventory check for electronics section",
        Priority::High,
        "New York Branch",
    ),
    (
        "Stock Replenishment",
        "Replenish low stock items in furniture section",
        Priority::Medium,
        "Los Angeles Branch",
    ),
];

pub async fn seed_demo_data(store: &Store, security: &SecurityConfig) -> Result<SeedSummary> {
    let txn = store.begin().await.context("Failed to start seed transaction")?;
    let summary = seed_in(&txn, security).await?;
    txn.commit().await.context("Failed to commit seed data")?;

    info!(
        "Seeded {} users, {} branches, {} goods, {} assignments, {} activities",
        summary.users, summary.branches, summary.goods, summary.assignments, summary.activities
    );
    Ok(summary)
}

async fn seed_in(txn: &DatabaseTransaction, security: &SecurityConfig) -> Result<SeedSummary> {
    let now = datetime::now();
    let mut summary = SeedSummary::default();

    let users = UserRepository::new(txn);
    let activities = ActivityRepository::new(txn);
    let mut user_ids: HashMap<&str, i32> = HashMap::new();

    for demo in &USERS {
        if let Some(existing) = users.get_by_username(demo.username).await? {
            info!("User {} already exists", demo.username);
            user_ids.insert(demo.username, existing.id);
            continue;
        }

        let password = demo.password.to_string();
        let params = security.clone();
        let hashed_password = task::spawn_blocking(move || hash_password(&password, Some(&params)))
            .await
            .context("Password hashing task panicked")??;

        let record = UserRecord {
            username: demo.username.to_string(),
            email: format!("{}@stockhub.com", demo.username),
            hashed_password,
            role: demo.role,
            first_name: Some(demo.first_name.to_string()),
            last_name: Some(demo.last_name.to_string()),
            phone: Some(demo.phone.to_string()),
            address: Some(demo.address.to_string()),
            is_active: true,
            branch_id: None,
            last_login: None,
            created_at: Some(now),
        };
        let id = users
            .insert(&record, now)
            .await
            .with_context(|| format!("Failed to create user {}", demo.username))?;
        user_ids.insert(demo.username, id);
        summary.users += 1;

        let activity = ActivityRecord {
            user: UserRef::Relational(id),
            action: "account_created".to_string(),
            description: Some(format!("Demo {} account created", demo.role)),
            category: Some("account".to_string()),
            ip_address: None,
            user_agent: Some("stockhub-sync seed".to_string()),
            timestamp: Some(now),
        };
        activities.insert(id, &activity, now).await?;
        summary.activities += 1;
    }

    let employee = user_ids.get("employee1").copied();
    let customer = user_ids.get("customer1").copied();

    let branch_repo = BranchRepository::new(txn);
    let existing: HashSet<String> = branch_repo.names().await?.into_iter().collect();
    for (name, location, description, image_url, capacity, available) in BRANCHES {
        if existing.contains(name) {
            continue;
        }
        let record = BranchRecord {
            name: name.to_string(),
            location: location.to_string(),
            description: Some(description.to_string()),
            image_url: Some(image_url.to_string()),
            manager_id: employee,
            capacity: Some(capacity),
            available_space: Some(available),
            created_at: Some(now),
        };
        branch_repo.insert(&record, now).await?;
        summary.branches += 1;
    }

    let branch_ids: HashMap<String, i32> = branch_repo
        .list()
        .await?
        .into_iter()
        .map(|b| (b.name, b.id))
        .collect();

    let goods_repo = GoodsRepository::new(txn);
    let existing: HashSet<String> = goods_repo.names().await?.into_iter().collect();
    for (name, description, category, quantity, price, branch) in GOODS {
        if existing.contains(name) {
            continue;
        }
        let record = GoodsRecord {
            name: name.to_string(),
            description: Some(description.to_string()),
            category: Some(category.to_string()),
            quantity,
            price_per_unit: price,
            owner_id: customer,
            branch_id: branch_ids.get(branch).copied(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        goods_repo.insert(&record, now).await?;
        summary.goods += 1;
    }

    let assignment_repo = AssignmentRepository::new(txn);
    let existing: HashSet<String> = assignment_repo.tasks().await?.into_iter().collect();
    for (task, description, priority, branch) in ASSIGNMENTS {
        if existing.contains(task) {
            continue;
        }
        let record = AssignmentRecord {
            employee_id: employee,
            task: task.to_string(),
            description: Some(description.to_string()),
            status: AssignmentStatus::Pending,
            priority,
            branch_id: branch_ids.get(branch).copied(),
            due_date: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        assignment_repo.insert(&record, now).await?;
        summary.assignments += 1;
    }

    Ok(summary)
}
