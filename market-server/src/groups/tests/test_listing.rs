use super::*;

async fn seed(manager: &GroupManager) -> Vec<String> {
    let mut ids = Vec::new();
    for (name, location, category) in [
        ("Pune Veggies", "Koregaon Park, Pune", "vegetables"),
        ("Mumbai Spices", "Andheri, Mumbai", "spices"),
        ("Camp Dairy", "PUNE Camp", "dairy"),
    ] {
        let data = BuyingGroupCreate {
            name: name.to_string(),
            location: location.to_string(),
            category: category.to_string(),
            ..Default::default()
        };
        ids.push(manager.create_group(data, &vendor(1)).await.unwrap());
        // Distinct creation times for a deterministic order
        tokio::time::sleep(std::time::Duration::from_millis(3)).await;
    }
    ids
}

#[tokio::test]
async fn test_list_newest_first() {
    let manager = create_test_manager();
    let ids = seed(&manager).await;

    let page = manager.list_groups(&GroupFilters::default()).await.unwrap();
    let listed: Vec<_> = page.items.iter().map(|g| g.id.clone()).collect();
    assert_eq!(listed, vec![ids[2].clone(), ids[1].clone(), ids[0].clone()]);
    assert_eq!(page.total, 3);
    assert!(!page.has_more);
    assert_eq!(page.limit, DEFAULT_PAGE_LIMIT);
}

#[tokio::test]
async fn test_list_filters() {
    let manager = create_test_manager();
    let ids = seed(&manager).await;
    manager.join_group(&ids[1], &vendor(7)).await.unwrap();

    let by_location = GroupFilters {
        location: Some("pune".to_string()),
        ..Default::default()
    };
    assert_eq!(manager.list_groups(&by_location).await.unwrap().total, 2);

    let by_category = GroupFilters {
        category: Some("spices".to_string()),
        ..Default::default()
    };
    let page = manager.list_groups(&by_category).await.unwrap();
    assert_eq!(page.items[0].id, ids[1]);

    let by_member = GroupFilters {
        member_id: Some("v7".to_string()),
        ..Default::default()
    };
    let page = manager.list_groups(&by_member).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, ids[1]);

    let by_status = GroupFilters {
        status: Some(GroupStatus::Full),
        ..Default::default()
    };
    assert_eq!(manager.list_groups(&by_status).await.unwrap().total, 0);
}

#[tokio::test]
async fn test_list_pagination() {
    let manager = create_test_manager();
    let ids = seed(&manager).await;

    let first = GroupFilters {
        limit: Some(2),
        ..Default::default()
    };
    let page = manager.list_groups(&first).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.has_more);
    assert_eq!(page.total, 3);

    let second = GroupFilters {
        limit: Some(2),
        offset: Some(2),
        ..Default::default()
    };
    let page = manager.list_groups(&second).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, ids[0]);
    assert!(!page.has_more);
}
