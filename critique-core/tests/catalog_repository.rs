use critique_core::database::ports::{NewTitle, TitleFilter, TitlePatch};
use critique_core::{CoreError, Page, Repositories};
use sqlx::PgPool;

async fn seed_catalog(repos: &Repositories) {
    repos.categories.create("Films", "films").await.unwrap();
    repos.categories.create("Books", "books").await.unwrap();
    repos.genres.create("Drama", "drama").await.unwrap();
    repos.genres.create("Comedy", "comedy").await.unwrap();
}

fn new_title(name: &str, year: i32, genre: &[&str]) -> NewTitle {
    NewTitle {
        name: name.into(),
        year,
        description: None,
        category: "films".into(),
        genre: genre.iter().map(|s| s.to_string()).collect(),
    }
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn duplicate_slug_is_a_conflict(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    repos.categories.create("Films", "films").await.unwrap();
    let err = repos
        .categories
        .create("Movies", "films")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)), "got {err:?}");
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn classifier_list_searches_by_name(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    seed_catalog(&repos).await;

    let (found, count) = repos
        .genres
        .list(Some("dra"), Page::new(10, 0))
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(found[0].slug, "drama");
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn title_roundtrip_resolves_slug_references(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    seed_catalog(&repos).await;

    let title = repos
        .titles
        .create(new_title("Solaris", 1972, &["drama", "comedy"]))
        .await
        .unwrap();

    let read_back = repos.titles.get(title.id).await.unwrap().unwrap();
    assert_eq!(read_back.category.slug, "films");
    let slugs: Vec<_> =
        read_back.genre.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(slugs, ["comedy", "drama"]);
    assert_eq!(read_back.rating, None);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn unresolvable_slugs_fail_validation(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    seed_catalog(&repos).await;

    let err = repos
        .titles
        .create(new_title("Solaris", 1972, &["jazz"]))
        .await
        .unwrap_err();
    assert!(
        matches!(err, CoreError::Validation { field: "genre", .. }),
        "got {err:?}"
    );

    let mut bad_category = new_title("Solaris", 1972, &["drama"]);
    bad_category.category = "vinyl".into();
    let err = repos.titles.create(bad_category).await.unwrap_err();
    assert!(
        matches!(err, CoreError::Validation { field: "category", .. }),
        "got {err:?}"
    );

    // Nothing was persisted by the failed attempts.
    let (titles, count) = repos
        .titles
        .list(&TitleFilter::default(), Page::new(10, 0))
        .await
        .unwrap();
    assert_eq!(count, 0);
    assert!(titles.is_empty());
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn empty_genre_list_is_rejected(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    seed_catalog(&repos).await;

    let err = repos
        .titles
        .create(new_title("Solaris", 1972, &[]))
        .await
        .unwrap_err();
    assert!(
        matches!(err, CoreError::Validation { field: "genre", .. }),
        "got {err:?}"
    );
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn filters_combine(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    seed_catalog(&repos).await;
    repos
        .titles
        .create(new_title("Solaris", 1972, &["drama"]))
        .await
        .unwrap();
    repos
        .titles
        .create(new_title("Stalker", 1979, &["drama"]))
        .await
        .unwrap();
    repos
        .titles
        .create(new_title("Airplane!", 1980, &["comedy"]))
        .await
        .unwrap();

    let filter = TitleFilter {
        genre: Some("drama".into()),
        ..Default::default()
    };
    let (_, count) = repos.titles.list(&filter, Page::new(10, 0)).await.unwrap();
    assert_eq!(count, 2);

    let filter = TitleFilter {
        genre: Some("drama".into()),
        year: Some(1979),
        ..Default::default()
    };
    let (titles, count) =
        repos.titles.list(&filter, Page::new(10, 0)).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(titles[0].name, "Stalker");

    let filter = TitleFilter {
        name: Some("sol".into()),
        ..Default::default()
    };
    let (titles, _) = repos.titles.list(&filter, Page::new(10, 0)).await.unwrap();
    assert_eq!(titles[0].name, "Solaris");

    let filter = TitleFilter {
        category: Some("books".into()),
        ..Default::default()
    };
    let (_, count) = repos.titles.list(&filter, Page::new(10, 0)).await.unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn patch_replaces_genres_and_keeps_the_rest(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    seed_catalog(&repos).await;
    let title = repos
        .titles
        .create(new_title("Solaris", 1972, &["drama", "comedy"]))
        .await
        .unwrap();

    let updated = repos
        .titles
        .update(
            title.id,
            TitlePatch {
                genre: Some(vec!["comedy".into()]),
                description: Some("a classic".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Solaris");
    assert_eq!(updated.description.as_deref(), Some("a classic"));
    let slugs: Vec<_> = updated.genre.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(slugs, ["comedy"]);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn deleting_a_category_cascades_into_titles(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    seed_catalog(&repos).await;
    let title = repos
        .titles
        .create(new_title("Solaris", 1972, &["drama"]))
        .await
        .unwrap();

    assert!(repos.categories.delete_by_slug("films").await.unwrap());
    assert!(repos.titles.get(title.id).await.unwrap().is_none());
}
