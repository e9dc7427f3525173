use ::httpmock::prelude::*;
use ::mydbs_client::{is_not_found, Credentials, ResourceClient};
use ::mydbs_common::{
    resource::{
        BackupState, BackupType, CreateBackupRequest, CreateDbInstanceRequest, InstanceState,
        ResourceId, RestartDbInstanceRequest, ShutdownMode, StopDbInstanceRequest,
    },
    serde_json::json,
    tokio,
};
use ::reqwest::StatusCode;

fn bearer_client(base_url: &str) -> ResourceClient {
    ResourceClient::new(
        base_url,
        Some(Credentials::Bearer {
            token: "admin".to_owned(),
        }),
    )
}

fn create_instance_request() -> CreateDbInstanceRequest {
    CreateDbInstanceRequest {
        display_name: "instance1".to_owned(),
        description: None,
        compartment_id: "cmp-1".to_owned(),
        subnet_id: "subnet-1".to_owned(),
        shape_name: "MySQL.VM.Standard.E3.1.8GB".to_owned(),
        mysql_version: "8.0.33".to_owned(),
        admin_username: "SampleAdmin".to_owned(),
        admin_password: "secret".to_owned(),
        data_storage_size_in_gbs: 50,
        port: 3306,
        freeform_tags: None,
    }
}

fn instance_body(id: &str, state: &str) -> ::mydbs_common::serde_json::Value {
    json!({
        "id": id,
        "display_name": "instance1",
        "compartment_id": "cmp-1",
        "lifecycle_state": state,
        "mysql_version": "8.0.33",
        "time_created": "2026-08-30T12:00:00Z"
    })
}

#[tokio::test]
async fn create_db_instance_success() {
    let server = MockServer::start();
    let request_body = create_instance_request();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/dbInstances")
            .header_exists("Authorization")
            .json_body_obj(&request_body);
        then.status(200).json_body(instance_body("abc", "CREATING"));
    });
    let client = bearer_client(&server.base_url());
    let instance = client.create_db_instance(&request_body).await.unwrap();

    mock.assert();
    assert_eq!(instance.id.to_string(), "abc");
    assert_eq!(instance.lifecycle_state, InstanceState::Creating);
}

#[tokio::test]
async fn create_db_instance_error() {
    let server = MockServer::start();
    let request_body = create_instance_request();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/dbInstances")
            .header_exists("Authorization")
            .json_body_obj(&request_body);
        then.status(500);
    });
    let client = bearer_client(&server.base_url());
    let err = client.create_db_instance(&request_body).await.unwrap_err();

    mock.assert();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn get_db_instance_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/dbInstances/abc")
            .header_exists("Authorization");
        then.status(200).json_body(instance_body("abc", "ACTIVE"));
    });
    let client = bearer_client(&server.base_url());
    let instance = client
        .get_db_instance(&"abc".try_into().unwrap())
        .await
        .unwrap();

    mock.assert();
    assert_eq!(instance.lifecycle_state, InstanceState::Active);
}

#[tokio::test]
async fn get_db_instance_not_found() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/dbInstances/abc")
            .header_exists("Authorization");
        then.status(404);
    });
    let client = bearer_client(&server.base_url());
    let err = client
        .get_db_instance(&"abc".try_into().unwrap())
        .await
        .unwrap_err();

    mock.assert();
    assert!(is_not_found(&err));
}

#[tokio::test]
async fn list_db_instances_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/dbInstances")
            .query_param("compartmentId", "cmp-1")
            .header_exists("Authorization");
        then.status(200).json_body(json!([
            instance_body("abc", "ACTIVE"),
            instance_body("def", "INACTIVE")
        ]));
    });
    let client = bearer_client(&server.base_url());
    let instances = client.list_db_instances("cmp-1").await.unwrap();

    mock.assert();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[1].lifecycle_state, InstanceState::Inactive);
}

#[tokio::test]
async fn delete_db_instance_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/dbInstances/abc")
            .header_exists("Authorization");
        then.status(200);
    });
    let client = bearer_client(&server.base_url());
    client
        .delete_db_instance(&"abc".try_into().unwrap())
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn delete_db_instance_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/dbInstances/abc")
            .header_exists("Authorization");
        then.status(500);
    });
    let client = bearer_client(&server.base_url());
    let err = client
        .delete_db_instance(&"abc".try_into().unwrap())
        .await
        .unwrap_err();

    mock.assert();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn stop_db_instance_success() {
    let server = MockServer::start();
    let request_body = StopDbInstanceRequest {
        shutdown_type: ShutdownMode::Fast,
    };
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/dbInstances/abc/actions/stop")
            .header_exists("Authorization")
            .json_body_obj(&request_body);
        then.status(200);
    });
    let client = bearer_client(&server.base_url());
    client
        .stop_db_instance(&"abc".try_into().unwrap(), &request_body)
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn start_db_instance_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/dbInstances/abc/actions/start")
            .header_exists("Authorization");
        then.status(200);
    });
    let client = bearer_client(&server.base_url());
    client
        .start_db_instance(&"abc".try_into().unwrap())
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn restart_db_instance_success() {
    let server = MockServer::start();
    let request_body = RestartDbInstanceRequest {
        shutdown_type: ShutdownMode::Immediate,
    };
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/dbInstances/abc/actions/restart")
            .header_exists("Authorization")
            .json_body_obj(&request_body);
        then.status(200);
    });
    let client = bearer_client(&server.base_url());
    client
        .restart_db_instance(&"abc".try_into().unwrap(), &request_body)
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn create_backup_success() {
    let server = MockServer::start();
    let request_body = CreateBackupRequest {
        display_name: "backup1".to_owned(),
        description: Some("full backup".to_owned()),
        backup_type: BackupType::Full,
        retention_in_days: 1,
        db_instance_id: ResourceId::try_from("abc").unwrap(),
    };
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/backups")
            .header_exists("Authorization")
            .json_body_obj(&request_body);
        then.status(200).json_body(json!({
            "id": "bkp-1",
            "display_name": "backup1",
            "lifecycle_state": "CREATING",
            "backup_type": "FULL",
            "db_instance_id": "abc"
        }));
    });
    let client = bearer_client(&server.base_url());
    let backup = client.create_backup(&request_body).await.unwrap();

    mock.assert();
    assert_eq!(backup.id.to_string(), "bkp-1");
    assert_eq!(backup.lifecycle_state, BackupState::Creating);
}

#[tokio::test]
async fn get_backup_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/backups/bkp-1")
            .header_exists("Authorization");
        then.status(200).json_body(json!({
            "id": "bkp-1",
            "display_name": "backup1",
            "lifecycle_state": "ACTIVE",
            "backup_type": "FULL",
            "db_instance_id": "abc"
        }));
    });
    let client = bearer_client(&server.base_url());
    let backup = client.get_backup(&"bkp-1".try_into().unwrap()).await.unwrap();

    mock.assert();
    assert_eq!(backup.lifecycle_state, BackupState::Active);
}

#[tokio::test]
async fn list_backups_filters_by_instance() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/backups")
            .query_param("compartmentId", "cmp-1")
            .query_param("dbInstanceId", "abc")
            .header_exists("Authorization");
        then.status(200).json_body(json!([{
            "id": "bkp-1",
            "display_name": "backup1",
            "lifecycle_state": "ACTIVE",
            "backup_type": "FULL",
            "db_instance_id": "abc"
        }]));
    });
    let client = bearer_client(&server.base_url());
    let backups = client
        .list_backups("cmp-1", Some(&"abc".try_into().unwrap()))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(backups.len(), 1);
}

#[tokio::test]
async fn delete_backup_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/backups/bkp-1")
            .header_exists("Authorization");
        then.status(409);
    });
    let client = bearer_client(&server.base_url());
    let err = client
        .delete_backup(&"bkp-1".try_into().unwrap())
        .await
        .unwrap_err();

    mock.assert();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
}

#[tokio::test]
async fn basic_auth_is_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/dbInstances/abc")
            .header_exists("Authorization");
        then.status(200).json_body(instance_body("abc", "ACTIVE"));
    });
    let client = ResourceClient::new(
        server.base_url(),
        Some(Credentials::Basic {
            username: "admin".to_owned(),
            password: Some("secret".to_owned()),
        }),
    );
    client
        .get_db_instance(&"abc".try_into().unwrap())
        .await
        .unwrap();

    mock.assert();
}
