use super::test_util::prepare_db_and_test;
use crate::domain::user::driven_ports::{CreateUserError, UserReader, UserWriter};
use crate::domain::user::CreateUser;
use crate::persistence;
use crate::persistence::db_user_driven_ports::{DbReadUsers, DbWriteUsers};
use speculoos::prelude::*;

fn sample_user() -> CreateUser {
    CreateUser {
        id: "integration-sub-1".to_owned(),
        given_name: "Evan".to_owned(),
        family_name: "Rittenhouse".to_owned(),
        username: "erittenhouse".to_owned(),
        email: "evan@example.com".to_owned(),
    }
}

#[test]
fn created_users_can_be_read_back() {
    prepare_db_and_test(|pool| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(pool);
        let user_reader = DbReadUsers {};
        let user_writer = DbWriteUsers {};

        let created = user_writer
            .create(&sample_user(), &mut ext_cxn)
            .await
            .expect("could not create user");
        assert_eq!("integration-sub-1", created.id);

        let by_id = user_reader
            .by_id("integration-sub-1", &mut ext_cxn)
            .await
            .expect("could not read user by id");
        assert_that!(by_id)
            .is_some()
            .matches(|user| user.username == "erittenhouse");

        let by_username = user_reader
            .by_username("erittenhouse", &mut ext_cxn)
            .await
            .expect("could not read user by username");
        assert_that!(by_username)
            .is_some()
            .matches(|user| user.id == "integration-sub-1");

        let by_email = user_reader
            .by_email("evan@example.com", &mut ext_cxn)
            .await
            .expect("could not read user by email");
        assert_that!(by_email)
            .is_some()
            .matches(|user| user.id == "integration-sub-1");
    });
}

#[test]
fn duplicate_users_are_rejected() {
    prepare_db_and_test(|pool| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(pool);
        let user_writer = DbWriteUsers {};

        user_writer
            .create(&sample_user(), &mut ext_cxn)
            .await
            .expect("could not create user");

        let duplicate_result = user_writer
            .create(
                &CreateUser {
                    id: "integration-sub-2".to_owned(),
                    ..sample_user()
                },
                &mut ext_cxn,
            )
            .await;
        let Err(CreateUserError::AlreadyExists) = duplicate_result else {
            panic!("Expected a duplicate rejection, got: {duplicate_result:#?}");
        };
    });
}

#[test]
fn unknown_users_produce_no_results() {
    prepare_db_and_test(|pool| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(pool);
        let user_reader = DbReadUsers {};

        let missing_user = user_reader
            .by_username("nobody", &mut ext_cxn)
            .await
            .expect("could not query for user");
        assert_that!(missing_user).is_none();
    });
}
