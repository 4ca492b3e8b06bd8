//! OpenAPI description of the auth endpoints.
//!
//! Paths are relative to wherever the auth routes are mounted; the API-level
//! generator re-keys them under its own prefix.

use serde_json::{Value, json};

use crate::password::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};

pub fn openapi_document() -> Value {
    json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Auth",
            "version": "1.0.0",
            "description": "Email/password authentication and session management",
        },
        "components": {
            "schemas": {
                "User": user_schema(),
                "Session": session_schema(),
            }
        },
        "paths": {
            "/sign-up/email": {
                "post": {
                    "tags": ["Auth"],
                    "operationId": "signUpEmail",
                    "summary": "Register with email and password",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string", "minLength": 1 },
                                "email": { "type": "string", "format": "email" },
                                "password": password_schema(),
                            },
                            "required": ["name", "email", "password"],
                        }}}
                    },
                    "responses": {
                        "200": signed_session_response(),
                        "400": { "description": "Invalid input" },
                        "422": { "description": "User already exists" },
                    }
                }
            },
            "/sign-in/email": {
                "post": {
                    "tags": ["Auth"],
                    "operationId": "signInEmail",
                    "summary": "Sign in with email and password",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": {
                            "type": "object",
                            "properties": {
                                "email": { "type": "string", "format": "email" },
                                "password": { "type": "string" },
                            },
                            "required": ["email", "password"],
                        }}}
                    },
                    "responses": {
                        "200": signed_session_response(),
                        "401": { "description": "Invalid email or password" },
                    }
                }
            },
            "/sign-out": {
                "post": {
                    "tags": ["Auth"],
                    "operationId": "signOut",
                    "summary": "Invalidate the current session",
                    "responses": {
                        "200": { "description": "Signed out", "content": { "application/json": { "schema": {
                            "type": "object",
                            "properties": { "success": { "type": "boolean" } },
                            "required": ["success"],
                        }}}}
                    }
                }
            },
            "/get-session": {
                "get": {
                    "tags": ["Auth"],
                    "operationId": "getSession",
                    "summary": "Return the current session, or null",
                    "responses": {
                        "200": { "description": "Current session", "content": { "application/json": { "schema": {
                            "anyOf": [
                                {
                                    "type": "object",
                                    "properties": {
                                        "session": { "$ref": "#/components/schemas/Session" },
                                        "user": { "$ref": "#/components/schemas/User" },
                                    },
                                    "required": ["session", "user"],
                                },
                                { "type": "null" }
                            ]
                        }}}}
                    }
                }
            }
        }
    })
}

fn password_schema() -> Value {
    json!({ "type": "string", "minLength": MIN_PASSWORD_LEN, "maxLength": MAX_PASSWORD_LEN })
}

fn signed_session_response() -> Value {
    json!({
        "description": "Session issued; the session cookie is also set",
        "content": { "application/json": { "schema": {
            "type": "object",
            "properties": {
                "token": { "type": "string" },
                "session": { "$ref": "#/components/schemas/Session" },
                "user": { "$ref": "#/components/schemas/User" },
            },
            "required": ["token", "session", "user"],
        }}}
    })
}

fn user_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "format": "uuid" },
            "name": { "type": "string" },
            "email": { "type": "string", "format": "email" },
            "emailVerified": { "type": "boolean" },
            "createdAt": { "type": "string", "format": "date-time" },
            "updatedAt": { "type": "string", "format": "date-time" },
        },
        "required": ["id", "name", "email", "emailVerified", "createdAt", "updatedAt"],
    })
}

fn session_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "format": "uuid" },
            "userId": { "type": "string", "format": "uuid" },
            "createdAt": { "type": "string", "format": "date-time" },
            "expiresAt": { "type": "string", "format": "date-time" },
            "ipAddress": { "type": ["string", "null"] },
            "userAgent": { "type": ["string", "null"] },
        },
        "required": ["id", "userId", "createdAt", "expiresAt"],
    })
}
